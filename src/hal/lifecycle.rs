use anyhow::{anyhow, Result};
use log::warn;

use super::{DeviceState, FrameSource};
use crate::core::Frame;

/// Manages the lifecycle of a FrameSource with proper state transitions.
///
/// A camera still running when this wrapper is dropped gets a synchronous
/// `release()`, so every exit path of the worker gives the device back.
pub struct ManagedCamera {
    inner: Box<dyn FrameSource>,
    state: DeviceState,
}

impl ManagedCamera {
    pub fn new(source: Box<dyn FrameSource>) -> Self {
        Self {
            inner: source,
            state: DeviceState::Unopened,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        if self.state != DeviceState::Unopened && self.state != DeviceState::Stopped {
            return Err(anyhow!("Cannot start camera in state {:?}", self.state));
        }
        match self.inner.start().await {
            Ok(()) => {
                self.state = DeviceState::Running;
                Ok(())
            }
            Err(e) => {
                self.state = DeviceState::Error(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn capture(&mut self) -> Result<Frame> {
        if self.state != DeviceState::Running {
            return Err(anyhow!("Camera not running"));
        }
        self.inner.capture().await
    }

    pub async fn stop(&mut self) -> Result<()> {
        if self.state != DeviceState::Running {
            return Ok(());
        }
        // The device is considered released even if the driver reports an error
        self.state = DeviceState::Stopped;
        self.inner.stop().await
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }
}

impl Drop for ManagedCamera {
    fn drop(&mut self) {
        if self.state == DeviceState::Running {
            warn!("Camera dropped while running, releasing");
            self.inner.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::SimulatedCamera;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_capture_requires_start() {
        let mut camera = ManagedCamera::new(Box::new(SimulatedCamera::new(4, 4)));
        assert!(camera.capture().await.is_err());

        camera.start().await.unwrap();
        assert_eq!(camera.state(), &DeviceState::Running);
        assert!(camera.capture().await.is_ok());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut camera = ManagedCamera::new(Box::new(SimulatedCamera::new(4, 4)));
        camera.start().await.unwrap();
        camera.stop().await.unwrap();
        camera.stop().await.unwrap();
        assert_eq!(camera.state(), &DeviceState::Stopped);
    }

    #[tokio::test]
    async fn test_drop_releases_running_camera() {
        let source = SimulatedCamera::new(4, 4);
        let running = source.running_flag();
        let mut camera = ManagedCamera::new(Box::new(source));
        camera.start().await.unwrap();
        assert!(running.load(Ordering::SeqCst));

        drop(camera);
        assert!(!running.load(Ordering::SeqCst));
    }
}
