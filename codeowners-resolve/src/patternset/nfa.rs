use crate::glob::SegmentGlob;

/// A non-deterministic automaton over path segments. Every transition
/// consumes exactly one segment; epsilon transitions always lead to a state
/// that loops on any segment, which is how `**` and prefix matching are
/// represented.
#[derive(Debug, Clone)]
pub(crate) struct Nfa {
    states: Vec<State>,
}

impl Nfa {
    pub(crate) const START_STATE: StateId = StateId(0);

    pub(crate) fn new() -> Self {
        Self {
            states: vec![State::new()],
        }
    }

    pub(crate) fn add_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(State::new());
        StateId(id as u32)
    }

    #[inline]
    pub(crate) fn state(&self, id: StateId) -> &State {
        &self.states[usize::from(id)]
    }

    #[inline]
    pub(crate) fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[usize::from(id)]
    }

    #[cfg(test)]
    pub(crate) fn states_iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub(crate) fn initial_states(&self) -> Vec<StateId> {
        let mut states = vec![Self::START_STATE];
        if let Some(epsilon_node_id) = self.state(Self::START_STATE).epsilon_transition {
            states.push(epsilon_node_id);
        }
        states
    }

    pub(crate) fn transitions_from(&self, state_id: StateId) -> impl Iterator<Item = &Transition> {
        self.state(state_id).transitions.iter()
    }

    pub(crate) fn epsilon_transition_from(&self, state_id: StateId) -> Option<StateId> {
        self.state(state_id).epsilon_transition
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct StateId(pub(crate) u32);

impl From<StateId> for usize {
    fn from(id: StateId) -> usize {
        id.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct State {
    pub(crate) terminal_for_patterns: Vec<usize>,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) epsilon_transition: Option<StateId>,
}

impl State {
    fn new() -> Self {
        Self {
            terminal_for_patterns: Vec::new(),
            transitions: Vec::new(),
            epsilon_transition: None,
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        !self.terminal_for_patterns.is_empty()
    }

    pub(crate) fn add_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub(crate) fn mark_as_terminal(&mut self, pattern_id: usize) {
        self.terminal_for_patterns.push(pattern_id);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Transition {
    pub(crate) path_segment: String,
    glob: SegmentGlob,
    pub(crate) target: StateId,
}

impl Transition {
    pub(crate) fn new(path_segment: String, target: StateId) -> Transition {
        let glob = SegmentGlob::new(&path_segment);
        Self {
            path_segment,
            glob,
            target,
        }
    }

    pub(crate) fn is_match(&self, candidate: &str) -> bool {
        self.glob.is_match(candidate)
    }
}
