//! Playback controls over a group of engine animations.

use std::fmt;

/// Playback state of one engine animation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlaybackState {
    Running,
    Finished,
    /// Stopped or superseded before it finished.
    Interrupted,
}

/// A single animation owned by the engine (typically one per style property).
pub trait Animation {
    fn stop(&mut self);
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, time: f64);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);
    fn playback_state(&self) -> PlaybackState;
}

/// Fans the control operations out over every animation started by one
/// `animate` call. Reads report the first animation.
#[derive(Default)]
pub struct AnimationControls {
    animations: Vec<Box<dyn Animation>>,
}

impl fmt::Debug for AnimationControls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationControls")
            .field("len", &self.animations.len())
            .field("finished", &self.finished())
            .finish()
    }
}

impl AnimationControls {
    pub fn new(animations: Vec<Box<dyn Animation>>) -> Self {
        Self { animations }
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn stop(&mut self) {
        for anim in self.animations.iter_mut() {
            anim.stop();
        }
    }

    /// Aggregate state: interrupted if any animation was interrupted,
    /// finished once all finished, running otherwise. Empty controls count
    /// as finished.
    pub fn finished(&self) -> PlaybackState {
        let mut all_finished = true;
        for anim in &self.animations {
            match anim.playback_state() {
                PlaybackState::Interrupted => return PlaybackState::Interrupted,
                PlaybackState::Running => all_finished = false,
                PlaybackState::Finished => {}
            }
        }
        if all_finished {
            PlaybackState::Finished
        } else {
            PlaybackState::Running
        }
    }

    pub fn current_time(&self) -> Option<f64> {
        self.animations.first().map(|a| a.current_time())
    }

    pub fn set_current_time(&mut self, time: f64) {
        for anim in self.animations.iter_mut() {
            anim.set_current_time(time);
        }
    }

    pub fn playback_rate(&self) -> Option<f64> {
        self.animations.first().map(|a| a.playback_rate())
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        for anim in self.animations.iter_mut() {
            anim.set_playback_rate(rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        time: f64,
        rate: f64,
        state: PlaybackState,
    }

    impl Fake {
        fn boxed(state: PlaybackState) -> Box<dyn Animation> {
            Box::new(Fake {
                time: 0.0,
                rate: 1.0,
                state,
            })
        }
    }

    impl Animation for Fake {
        fn stop(&mut self) {
            if self.state == PlaybackState::Running {
                self.state = PlaybackState::Interrupted;
            }
        }
        fn current_time(&self) -> f64 {
            self.time
        }
        fn set_current_time(&mut self, time: f64) {
            self.time = time;
        }
        fn playback_rate(&self) -> f64 {
            self.rate
        }
        fn set_playback_rate(&mut self, rate: f64) {
            self.rate = rate;
        }
        fn playback_state(&self) -> PlaybackState {
            self.state
        }
    }

    #[test]
    fn setters_fan_out() {
        let mut controls = AnimationControls::new(vec![
            Fake::boxed(PlaybackState::Running),
            Fake::boxed(PlaybackState::Running),
        ]);
        controls.set_current_time(0.25);
        controls.set_playback_rate(2.0);
        assert_eq!(controls.current_time(), Some(0.25));
        assert_eq!(controls.playback_rate(), Some(2.0));
        assert_eq!(controls.finished(), PlaybackState::Running);

        controls.stop();
        assert_eq!(controls.finished(), PlaybackState::Interrupted);
    }

    #[test]
    fn aggregate_state() {
        let done = AnimationControls::new(vec![
            Fake::boxed(PlaybackState::Finished),
            Fake::boxed(PlaybackState::Finished),
        ]);
        assert_eq!(done.finished(), PlaybackState::Finished);

        let partial = AnimationControls::new(vec![
            Fake::boxed(PlaybackState::Finished),
            Fake::boxed(PlaybackState::Running),
        ]);
        assert_eq!(partial.finished(), PlaybackState::Running);

        let empty = AnimationControls::default();
        assert!(empty.is_empty());
        assert_eq!(empty.finished(), PlaybackState::Finished);
        assert_eq!(empty.current_time(), None);
    }
}
