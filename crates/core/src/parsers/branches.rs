use commit_graph_protocol::BranchInfo;

/// Parse `git branch` output.
///
/// The current branch is marked with `* `; branches checked out in other
/// worktrees carry `+ ` and are not HEAD. A detached HEAD line such as
/// `* (HEAD detached at 1a2b3c)` is kept as the head entry.
pub fn parse_branch_list(text: &str) -> Vec<BranchInfo> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim_end();
            if line.trim().is_empty() {
                return None;
            }
            let (is_head, name) = match line.get(..2) {
                Some("* ") => (true, &line[2..]),
                Some("+ ") => (false, &line[2..]),
                _ => (false, line),
            };
            let name = name.trim();
            // `remotes/origin/HEAD -> origin/main` under `--all`
            if name.contains(" -> ") {
                return None;
            }
            Some(BranchInfo {
                name: name.to_string(),
                is_head,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_current_branch() {
        let branches = parse_branch_list("  feature\n* main\n+ wip\n");
        let names: Vec<(&str, bool)> = branches
            .iter()
            .map(|b| (b.name.as_str(), b.is_head))
            .collect();
        assert_eq!(
            names,
            vec![("feature", false), ("main", true), ("wip", false)]
        );
    }

    #[test]
    fn keeps_detached_head() {
        let branches = parse_branch_list("* (HEAD detached at 1a2b3c4)\n  main\n");
        assert_eq!(branches.len(), 2);
        assert!(branches[0].is_head);
        assert!(branches[0].name.starts_with("(HEAD detached"));
    }

    #[test]
    fn skips_symbolic_refs_and_blank_lines() {
        let text = "\n  remotes/origin/HEAD -> origin/main\n  remotes/origin/main\n";
        let branches = parse_branch_list(text);
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].name, "remotes/origin/main");
    }
}
