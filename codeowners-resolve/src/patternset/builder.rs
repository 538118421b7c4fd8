use crate::pattern::Shape;

use super::{
    nfa::{Nfa, StateId, Transition},
    TreeMatcher,
};

/// Builder for a patternset [`TreeMatcher`]. Calling [`Builder::build`] will
/// consume the builder.
#[derive(Clone)]
pub(crate) struct Builder {
    nfa: Nfa,
    next_pattern_id: usize,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            nfa: Nfa::new(),
            next_pattern_id: 0,
        }
    }

    /// Build the `TreeMatcher` from the patterns added to the builder.
    pub(crate) fn build(self) -> TreeMatcher {
        TreeMatcher::new(self.nfa)
    }

    /// Add a pattern to the builder, returning its id. Ids are assigned in
    /// insertion order starting from zero.
    pub(crate) fn add(&mut self, pattern: &str) -> usize {
        let pattern_id = self.next_pattern_id;
        self.next_pattern_id += 1;

        let shape = Shape::parse(pattern);
        if shape.is_void() {
            return pattern_id;
        }

        // Unanchored patterns may start at any depth, which is the same as
        // starting with a `**` segment.
        let start_state_id = if shape.anchored {
            Nfa::START_STATE
        } else {
            self.add_epsilon_transition(Nfa::START_STATE)
        };

        // Add states and transitions for each of the pattern components.
        let mut end_state_id =
            shape
                .segments
                .iter()
                .fold(start_state_id, |from_id, segment| match *segment {
                    "**" => self.add_epsilon_transition(from_id),
                    _ => self.add_transition(from_id, segment),
                });

        // Directory-only patterns match everything under the directory, but
        // not the directory itself, so we need one more segment
        if shape.dir_only {
            end_state_id = self.add_transition(end_state_id, "*");
        }

        // Prefix matching is a self loop on a state reached by an epsilon
        // transition. Patterns ending in a lone `*` are the exception and only
        // match direct children.
        if shape.is_recursive() {
            end_state_id = self.add_epsilon_transition(end_state_id);
        }

        self.nfa
            .state_mut(end_state_id)
            .mark_as_terminal(pattern_id);

        pattern_id
    }

    // Add a regular (non-epsilon) transition from a given state via the
    // provided path segment, reusing an identical existing transition.
    fn add_transition(&mut self, from_id: StateId, segment: &str) -> StateId {
        let existing_transition = self
            .nfa
            .transitions_from(from_id)
            .find(|t| t.path_segment == segment && t.target != from_id);
        if let Some(t) = existing_transition {
            t.target
        } else {
            let state_id = self.nfa.add_state();
            self.nfa
                .state_mut(from_id)
                .add_transition(Transition::new(segment.to_owned(), state_id));
            state_id
        }
    }

    // Add an epsilon transition from a given state to a new looping state. If
    // an epsilon transition already exists, return its target instead.
    fn add_epsilon_transition(&mut self, from_id: StateId) -> StateId {
        // A state that already loops on any segment absorbs further `**`
        // segments; chaining loop states would require extra segments.
        let has_self_loop = self
            .nfa
            .transitions_from(from_id)
            .any(|t| t.path_segment == "*" && t.target == from_id);
        if has_self_loop {
            return from_id;
        }

        match self.nfa.state(from_id).epsilon_transition {
            Some(to_id) => to_id,
            None => {
                let state_id = self.nfa.add_state();
                self.nfa
                    .state_mut(state_id)
                    .add_transition(Transition::new("*".to_owned(), state_id));
                self.nfa.state_mut(from_id).epsilon_transition = Some(state_id);
                state_id
            }
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfa_builder() {
        let mut builder = Builder::new();

        builder.add("/foo/*");
        assert_eq!(
            transitions_for(&builder.nfa),
            vec![(0, "foo".to_owned(), 1), (1, "*".to_owned(), 2)]
        );

        builder.add("/foo/bar");
        assert_eq!(
            transitions_for(&builder.nfa),
            vec![
                (0, "foo".to_owned(), 1),
                (1, "*".to_owned(), 2),
                (1, "bar".to_owned(), 3),
                (4, "*".to_owned(), 4)
            ]
        );
    }

    #[test]
    fn test_shared_any_depth_state() {
        let mut builder = Builder::new();
        builder.add("foo");
        builder.add("**/foo");

        // Both patterns start from the same looping state and share the
        // transition out of it.
        let transitions = transitions_for(&builder.nfa);
        assert_eq!(
            transitions
                .iter()
                .filter(|(_, segment, _)| segment == "foo")
                .count(),
            1
        );
        let terminal = builder
            .nfa
            .states_iter()
            .find(|state| state.is_terminal())
            .map(|state| state.terminal_for_patterns.clone());
        assert_eq!(terminal, Some(vec![0, 1]));
    }

    #[test]
    fn test_void_pattern() {
        let mut builder = Builder::new();
        assert_eq!(builder.add("/"), 0);
        assert_eq!(builder.add("foo"), 1);
        assert!(!builder
            .nfa
            .states_iter()
            .any(|state| state.terminal_for_patterns.contains(&0)));
    }

    #[test]
    fn test_dot_output() {
        let mut builder = Builder::new();
        builder.add("/modules/thanos-*/**");
        let dot = generate_dot(&builder.nfa);
        assert!(dot.contains("[label=\"thanos-*\"]"));
        assert!(dot.contains("doublecircle"));
    }

    fn generate_dot(nfa: &Nfa) -> String {
        let mut dot = String::from("digraph G {\n  rankdir=\"LR\"\n");
        for (state_id, state) in nfa.states_iter().enumerate() {
            if state.is_terminal() {
                dot.push_str(&format!("  s{} [shape=doublecircle];\n", state_id));
            }
            for transition in state.transitions.iter() {
                dot.push_str(&format!(
                    "  s{} -> s{} [label=\"{}\"];\n",
                    state_id, transition.target.0, transition.path_segment
                ));
            }
            if let Some(next_state_id) = state.epsilon_transition {
                dot.push_str(&format!(
                    "  s{} -> s{} [label=\"ε\"];\n",
                    state_id, next_state_id.0
                ));
            }
        }
        dot.push_str("}\n");
        dot
    }

    fn transitions_for(nfa: &Nfa) -> Vec<(usize, String, usize)> {
        nfa.states_iter()
            .enumerate()
            .flat_map(|(idx, s)| {
                s.transitions
                    .iter()
                    .map(|t| (idx, t.path_segment.clone(), t.target.0 as usize))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
