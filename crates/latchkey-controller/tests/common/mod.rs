//! Shared fixtures for the session tests.

#![allow(dead_code)]

use latchkey_capture::mock::{MockCamera, MockCameraHandle, MockViewer, MockViewerHandle};
use latchkey_controller::{AccessController, EnrollmentSession};
use latchkey_core::config::{PathsConfig, SessionConfig};
use latchkey_core::{Credential, PersonName};
use latchkey_hardware::mock::{MockActuator, MockActuatorHandle, MockDisplay, MockDisplayHandle};
use latchkey_hardware::{AnyActuator, AnyDisplay, Peripherals};
use latchkey_storage::{IdentityRepository, InMemoryIdentityRepository, NewIdentity};
use std::path::PathBuf;
use tempfile::TempDir;

/// Mock peripherals, an in-memory store and a temporary base directory.
pub struct Rig {
    pub peripherals: Peripherals,
    pub latch: MockActuatorHandle,
    pub screen: MockDisplayHandle,
    pub store: InMemoryIdentityRepository,
    pub base: TempDir,
}

impl Rig {
    pub fn new() -> Self {
        let (actuator, latch) = MockActuator::new();
        let (display, screen) = MockDisplay::new();
        Self {
            peripherals: Peripherals::new(AnyActuator::Mock(actuator), AnyDisplay::Mock(display)),
            latch,
            screen,
            store: InMemoryIdentityRepository::new(),
            base: tempfile::tempdir().unwrap(),
        }
    }

    pub fn paths(&self) -> PathsConfig {
        PathsConfig {
            base_dir: self.base.path().to_path_buf(),
            ..PathsConfig::default()
        }
    }

    pub fn photos_dir(&self) -> PathBuf {
        self.paths().photos_path()
    }

    /// Register an identity directly in the store, optionally with its
    /// photo file on disk.
    pub async fn register(&self, name: &str, credential: &str, photo: &str, with_file: bool) {
        if with_file {
            let path = self.base.path().join(photo);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, b"\xFF\xD8fixture\xFF\xD9").unwrap();
        }
        self.store
            .create(&NewIdentity::new(
                PersonName::new(name).unwrap(),
                Credential::new(credential).unwrap(),
                photo,
            ))
            .await
            .unwrap();
    }

    pub fn access(&self) -> (AccessController<InMemoryIdentityRepository, MockViewer>, MockViewerHandle) {
        self.access_with(SessionConfig::default())
    }

    pub fn access_with(
        &self,
        timing: SessionConfig,
    ) -> (AccessController<InMemoryIdentityRepository, MockViewer>, MockViewerHandle) {
        let (viewer, handle) = MockViewer::new();
        (
            AccessController::new(self.store.clone(), viewer, self.paths(), timing),
            handle,
        )
    }

    pub fn enrollment(
        &self,
        camera: (MockCamera, MockCameraHandle),
    ) -> (EnrollmentSession<InMemoryIdentityRepository, MockCamera>, MockCameraHandle) {
        let (camera, handle) = camera;
        (
            EnrollmentSession::new(
                self.store.clone(),
                camera,
                self.paths(),
                SessionConfig::default(),
            ),
            handle,
        )
    }

    /// Files currently in the photos directory.
    pub fn photos_on_disk(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.photos_dir()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of writes whose text equals `text`.
    pub fn writes_of(&self, text: &str) -> usize {
        self.screen.writes().iter().filter(|w| *w == text).count()
    }
}
