use std::collections::VecDeque;

use super::state::BehaviorState;

/// FIFO of states to play once the current one finishes.
#[derive(Debug, Clone, Default)]
pub struct AnimationQueue {
    pending: VecDeque<BehaviorState>,
}

impl AnimationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, state: BehaviorState) {
        self.pending.push_back(state);
    }

    pub fn enqueue_all(&mut self, states: &[BehaviorState]) {
        self.pending.extend(states.iter().copied());
    }

    pub fn pop_next(&mut self) -> Option<BehaviorState> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_order() {
        let mut q = AnimationQueue::new();
        q.enqueue_all(&[BehaviorState::Yawning, BehaviorState::Sleeping]);
        q.enqueue(BehaviorState::Idle);
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop_next(), Some(BehaviorState::Yawning));
        assert_eq!(q.pop_next(), Some(BehaviorState::Sleeping));
        assert_eq!(q.pop_next(), Some(BehaviorState::Idle));
        assert_eq!(q.pop_next(), None);
    }

    #[test]
    fn clear_empties() {
        let mut q = AnimationQueue::new();
        q.enqueue(BehaviorState::Yawning);
        q.clear();
        assert!(q.is_empty());
    }
}
