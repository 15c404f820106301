use bevy::log::warn;
use std::fmt::Debug;

use super::easing::{Easing, lerp};

/// Property bag a sequence mutates. `read` returns `None` when the node
/// behind the property is absent, which turns the step into a no-op.
pub trait TweenTarget<P> {
    fn read(&self, property: P) -> Option<Vec<f32>>;
    fn write(&mut self, property: P, values: &[f32]);
}

/// Emitted by `TweenSequence::advance` in the order things happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    StepStarted(usize),
    StepCompleted(usize),
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TweenStep<P> {
    pub property: P,
    pub to: Vec<f32>,
    pub duration: f32,
    pub easing: Easing,
    from: Option<Vec<f32>>,
    elapsed: f32,
    started: bool,
    skipped: bool,
}

impl<P: Copy + Debug> TweenStep<P> {
    pub fn new(property: P, to: Vec<f32>, duration: f32, easing: Easing) -> Self {
        Self {
            property,
            to,
            duration: duration.max(0.0),
            easing,
            from: None,
            elapsed: 0.0,
            started: false,
            skipped: false,
        }
    }

    fn begin<T: TweenTarget<P>>(&mut self, target: &T) {
        self.started = true;
        match target.read(self.property) {
            Some(values) if values.len() == self.to.len() => self.from = Some(values),
            Some(values) => {
                warn!(
                    "Tween step {:?} expected {} channels, target has {}; skipping",
                    self.property,
                    self.to.len(),
                    values.len()
                );
                self.skipped = true;
            }
            None => {
                warn!("Tween target for {:?} is missing; skipping step", self.property);
                self.skipped = true;
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.skipped || self.elapsed >= self.duration
    }

    /// Consume up to `dt` seconds and return whatever is left over once the
    /// step completes.
    fn advance<T: TweenTarget<P>>(&mut self, dt: f32, target: &mut T) -> f32 {
        if self.skipped {
            return dt;
        }
        let Some(from) = self.from.as_ref() else {
            return dt;
        };

        self.elapsed += dt;
        let leftover = (self.elapsed - self.duration).max(0.0);
        self.elapsed = self.elapsed.min(self.duration);

        let t = if self.duration <= 0.0 {
            1.0
        } else {
            self.easing.apply(self.elapsed / self.duration)
        };
        let values: Vec<f32> = from
            .iter()
            .zip(&self.to)
            .map(|(start, end)| lerp(*start, *end, t))
            .collect();
        target.write(self.property, &values);

        leftover
    }
}

/// Strictly sequential chain of tween steps. Each step starts from whatever
/// value the target holds when the previous step completes.
#[derive(Debug, Clone)]
pub struct TweenSequence<P> {
    steps: Vec<TweenStep<P>>,
    current: usize,
    is_animating: bool,
}

impl<P> Default for TweenSequence<P> {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            current: 0,
            is_animating: false,
        }
    }
}

impl<P: Copy + Debug> TweenSequence<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Ignored while the sequence is running.
    pub fn push(&mut self, step: TweenStep<P>) -> bool {
        if self.is_animating {
            return false;
        }
        self.steps.push(step);
        true
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn current_step(&self) -> Option<usize> {
        self.is_animating.then_some(self.current)
    }

    /// Begin running the queued steps. No-op if already running or empty.
    pub fn start(&mut self) -> bool {
        if self.is_animating || self.steps.is_empty() {
            return false;
        }
        self.current = 0;
        self.is_animating = true;
        true
    }

    /// Drop every step and stop. Used on teardown.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.current = 0;
        self.is_animating = false;
    }

    pub fn advance<T: TweenTarget<P>>(&mut self, dt: f32, target: &mut T) -> Vec<SequenceEvent> {
        let mut events = Vec::new();
        let mut remaining = dt.max(0.0);

        while self.is_animating {
            let index = self.current;
            let step = &mut self.steps[index];

            if !step.started {
                step.begin(target);
                events.push(SequenceEvent::StepStarted(index));
            }

            remaining = step.advance(remaining, target);
            if !step.is_finished() {
                break;
            }

            events.push(SequenceEvent::StepCompleted(index));
            self.current += 1;

            if self.current >= self.steps.len() {
                self.clear();
                events.push(SequenceEvent::Finished);
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Prop {
        X,
        Rgb,
        Missing,
    }

    #[derive(Default)]
    struct Bag {
        values: HashMap<Prop, Vec<f32>>,
        writes: usize,
    }

    impl TweenTarget<Prop> for Bag {
        fn read(&self, property: Prop) -> Option<Vec<f32>> {
            self.values.get(&property).cloned()
        }

        fn write(&mut self, property: Prop, values: &[f32]) {
            self.writes += 1;
            self.values.insert(property, values.to_vec());
        }
    }

    fn bag() -> Bag {
        let mut bag = Bag::default();
        bag.values.insert(Prop::X, vec![0.0]);
        bag.values.insert(Prop::Rgb, vec![0.0, 0.0, 0.0]);
        bag
    }

    #[test]
    fn steps_run_in_order_and_finish() {
        let mut bag = bag();
        let mut sequence = TweenSequence::new();
        sequence.push(TweenStep::new(Prop::X, vec![10.0], 1.0, Easing::Linear));
        sequence.push(TweenStep::new(Prop::Rgb, vec![1.0, 0.5, 0.0], 2.0, Easing::Linear));
        assert!(sequence.start());

        let events = sequence.advance(0.5, &mut bag);
        assert_eq!(events, vec![SequenceEvent::StepStarted(0)]);
        assert_eq!(bag.values[&Prop::X], vec![5.0]);

        // Leftover time spills into the next step.
        let events = sequence.advance(1.5, &mut bag);
        assert_eq!(
            events,
            vec![
                SequenceEvent::StepCompleted(0),
                SequenceEvent::StepStarted(1)
            ]
        );
        assert_eq!(bag.values[&Prop::X], vec![10.0]);
        assert_eq!(bag.values[&Prop::Rgb], vec![0.5, 0.25, 0.0]);

        let events = sequence.advance(1.0, &mut bag);
        assert_eq!(
            events,
            vec![SequenceEvent::StepCompleted(1), SequenceEvent::Finished]
        );
        assert!(!sequence.is_animating());
        assert!(sequence.is_empty());
        assert_eq!(bag.values[&Prop::Rgb], vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn second_start_is_a_no_op() {
        let mut sequence = TweenSequence::new();
        sequence.push(TweenStep::new(Prop::X, vec![1.0], 1.0, Easing::Linear));
        assert!(sequence.start());
        assert!(!sequence.start());
        assert!(!sequence.push(TweenStep::new(Prop::X, vec![2.0], 1.0, Easing::Linear)));
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn missing_target_degrades_to_no_op() {
        let mut bag = bag();
        let mut sequence = TweenSequence::new();
        sequence.push(TweenStep::new(Prop::Missing, vec![1.0], 5.0, Easing::Linear));
        sequence.push(TweenStep::new(Prop::X, vec![4.0], 0.0, Easing::Linear));
        sequence.start();

        let events = sequence.advance(0.0, &mut bag);
        assert_eq!(
            events,
            vec![
                SequenceEvent::StepStarted(0),
                SequenceEvent::StepCompleted(0),
                SequenceEvent::StepStarted(1),
                SequenceEvent::StepCompleted(1),
                SequenceEvent::Finished,
            ]
        );
        assert!(!bag.values.contains_key(&Prop::Missing));
        assert_eq!(bag.values[&Prop::X], vec![4.0]);
    }

    #[test]
    fn mismatched_channels_skip_step() {
        let mut bag = bag();
        let mut sequence = TweenSequence::new();
        sequence.push(TweenStep::new(Prop::X, vec![1.0, 2.0], 1.0, Easing::Linear));
        sequence.start();
        sequence.advance(0.1, &mut bag);
        assert!(!sequence.is_animating());
        assert_eq!(bag.writes, 0);
    }

    #[test]
    fn empty_sequence_does_not_start() {
        let mut sequence: TweenSequence<Prop> = TweenSequence::new();
        assert!(!sequence.start());
        assert_eq!(sequence.current_step(), None);
    }
}
