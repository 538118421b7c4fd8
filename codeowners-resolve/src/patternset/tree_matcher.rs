use crate::path_tree::PathTree;

use super::nfa::{Nfa, StateId};

/// Matches many paths against a set of patterns at once. The paths are
/// arranged in a [`PathTree`] so that each directory is stepped through the
/// NFA only once, no matter how many paths live beneath it. Created using a
/// [`super::Builder`].
#[derive(Debug, Clone)]
pub(crate) struct TreeMatcher {
    nfa: Nfa,
}

impl TreeMatcher {
    pub(crate) fn new(nfa: Nfa) -> TreeMatcher {
        Self { nfa }
    }

    /// Match many paths against the patterns in the set. Returns, for each
    /// input path in order, the ids of the patterns that match it. Pattern
    /// ids follow the order in which patterns were added to the builder.
    pub(crate) fn matches_for_paths(&self, paths: &[impl AsRef<str>]) -> Vec<Vec<usize>> {
        let mut tree = PathTree::new();
        for (index, path) in paths.iter().enumerate() {
            tree.insert(path.as_ref(), index);
        }

        let mut matches = vec![Vec::new(); paths.len()];
        let mut queue = vec![(self.nfa.initial_states(), PathTree::root_id())];
        while let Some((states, node_id)) = queue.pop() {
            let node = tree.node(node_id);
            if !node.paths.is_empty() {
                // We've reached a path node. Check if any of the states are
                // accepting.
                for &id in &states {
                    let state = self.nfa.state(id);
                    if state.is_terminal() {
                        for &index in &node.paths {
                            matches[index].extend(state.terminal_for_patterns.iter().copied());
                        }
                    }
                }
            }

            for (segment, child_id) in &node.children {
                let next_states = self.next_states(segment, &states);
                if !next_states.is_empty() {
                    queue.push((next_states, *child_id));
                }
            }
        }

        for ids in &mut matches {
            ids.sort_unstable();
            ids.dedup();
        }
        matches
    }

    // Given a set of states and the next path segment, return the set of
    // states we're in after stepping through the NFA, including the targets
    // of any epsilon transitions.
    fn next_states(&self, segment: &str, from_states: &[StateId]) -> Vec<StateId> {
        let mut next_states = Vec::new();
        for &state_id in from_states {
            self.nfa
                .transitions_from(state_id)
                .filter(|transition| transition.is_match(segment))
                .for_each(|transition| next_states.push(transition.target));
        }

        // Automatically traverse epsilon edges
        let epsilon_nodes = next_states
            .iter()
            .filter_map(|&state_id| self.nfa.epsilon_transition_from(state_id))
            .collect::<Vec<_>>();
        next_states.extend(epsilon_nodes);

        // Several patterns can lead into the same looping state; without
        // deduplication the state set grows with every segment.
        next_states.sort_unstable();
        next_states.dedup();
        next_states
    }
}
