//! Speech-capture capability seam.
//!
//! Speech recognition is an environment-provided capability (a browser API,
//! an OS service), not part of the core. The conversation logic depends
//! only on this trait, so it stays platform-independent.

use crate::error::ClientError;

/// Environment-provided speech capture.
///
/// At most one capture session is active at a time.
pub trait SpeechCapture {
    /// Whether capture is available in this environment.
    fn is_available(&self) -> bool;

    /// Whether a capture session is currently active.
    fn is_active(&self) -> bool;

    /// Begin a capture session.
    fn start_capture(&mut self) -> Result<(), ClientError>;

    /// End the session, returning the transcript if one was produced.
    fn stop(&mut self) -> Result<Option<String>, ClientError>;
}

/// Toggle capture from a single control.
///
/// Requesting capture while a session is active means "stop": the active
/// session ends and its transcript is returned.
pub fn toggle_capture(capture: &mut dyn SpeechCapture) -> Result<Option<String>, ClientError> {
    if capture.is_active() {
        capture.stop()
    } else {
        capture.start_capture().map(|_| None)
    }
}

/// No-op capture for environments without speech recognition.
#[derive(Debug, Default)]
pub struct UnsupportedCapture;

impl SpeechCapture for UnsupportedCapture {
    fn is_available(&self) -> bool {
        false
    }

    fn is_active(&self) -> bool {
        false
    }

    fn start_capture(&mut self) -> Result<(), ClientError> {
        Err(ClientError::CaptureUnsupported)
    }

    fn stop(&mut self) -> Result<Option<String>, ClientError> {
        Err(ClientError::CaptureInactive)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted capture used to exercise the toggle semantics.
    struct ScriptedCapture {
        active: bool,
        transcript: Option<String>,
    }

    impl ScriptedCapture {
        fn new(transcript: &str) -> Self {
            Self {
                active: false,
                transcript: Some(transcript.to_string()),
            }
        }
    }

    impl SpeechCapture for ScriptedCapture {
        fn is_available(&self) -> bool {
            true
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn start_capture(&mut self) -> Result<(), ClientError> {
            if self.active {
                return Err(ClientError::CaptureActive);
            }
            self.active = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<Option<String>, ClientError> {
            if !self.active {
                return Err(ClientError::CaptureInactive);
            }
            self.active = false;
            Ok(self.transcript.take())
        }
    }

    #[test]
    fn test_unsupported_capture() {
        let mut capture = UnsupportedCapture;
        assert!(!capture.is_available());
        assert!(!capture.is_active());
        assert!(matches!(
            capture.start_capture(),
            Err(ClientError::CaptureUnsupported)
        ));
        assert!(matches!(capture.stop(), Err(ClientError::CaptureInactive)));
    }

    #[test]
    fn test_toggle_starts_when_idle() {
        let mut capture = ScriptedCapture::new("hello");
        let result = toggle_capture(&mut capture).unwrap();
        assert!(result.is_none());
        assert!(capture.is_active());
    }

    #[test]
    fn test_toggle_while_active_means_stop() {
        let mut capture = ScriptedCapture::new("How do I stay motivated?");
        toggle_capture(&mut capture).unwrap();

        let transcript = toggle_capture(&mut capture).unwrap();
        assert_eq!(transcript.as_deref(), Some("How do I stay motivated?"));
        assert!(!capture.is_active());
    }

    #[test]
    fn test_double_start_is_rejected() {
        let mut capture = ScriptedCapture::new("hi");
        capture.start_capture().unwrap();
        assert!(matches!(
            capture.start_capture(),
            Err(ClientError::CaptureActive)
        ));
    }

    #[test]
    fn test_stop_when_idle_is_rejected() {
        let mut capture = ScriptedCapture::new("hi");
        assert!(matches!(capture.stop(), Err(ClientError::CaptureInactive)));
    }

    #[test]
    fn test_toggle_on_unsupported_surfaces_error() {
        let mut capture = UnsupportedCapture;
        assert!(matches!(
            toggle_capture(&mut capture),
            Err(ClientError::CaptureUnsupported)
        ));
    }
}
