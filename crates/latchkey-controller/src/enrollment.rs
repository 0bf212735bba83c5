//! Enrollment: name and key entry, photo capture, identity creation.
//!
//! The photo is written before the identity is inserted. If the insert
//! fails, the photo is deleted again, so a failed enrollment leaves neither
//! a row nor a file behind. Photos are created with `create_new`: a filename
//! collision fails the write instead of replacing another person's photo.

use crate::error::{SessionError, SessionResult};
use crate::input::{OperatorInput, require_line};
use crate::messages::{self, DisplayMessages};
use crate::show_error;
use chrono::Local;
use latchkey_capture::{CapturedPhoto, PhotoSource};
use latchkey_core::config::{PathsConfig, SessionConfig};
use latchkey_core::naming::{photo_filename, relative_photo_path};
use latchkey_core::{Credential, IdentityId, PersonName};
use latchkey_hardware::Peripherals;
use latchkey_storage::{IdentityRepository, NewIdentity};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Validated enrollment data, before the photo is taken.
#[derive(Debug, Clone)]
pub struct EnrollmentDraft {
    pub name: PersonName,
    pub credential: Credential,
}

impl EnrollmentDraft {
    /// Validate raw operator input.
    ///
    /// The name is trimmed; the credential is kept exactly as typed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the credential is empty.
    pub fn new(name: &str, credential: impl Into<String>) -> SessionResult<Self> {
        Ok(Self {
            name: PersonName::new(name)?,
            credential: Credential::new(credential)?,
        })
    }
}

/// A committed enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrolled {
    pub id: IdentityId,
    /// Stored (base-relative) photo path.
    pub photo_path: String,
}

/// Enrolls new identities.
#[derive(Debug)]
pub struct EnrollmentSession<R, C> {
    identities: R,
    camera: C,
    paths: PathsConfig,
    timing: SessionConfig,
}

impl<R, C> EnrollmentSession<R, C>
where
    R: IdentityRepository,
    C: PhotoSource,
{
    pub fn new(identities: R, camera: C, paths: PathsConfig, timing: SessionConfig) -> Self {
        Self {
            identities,
            camera,
            paths,
            timing,
        }
    }

    /// Run one enrollment: collect name and key, then [`commit`](Self::commit).
    ///
    /// Failures are shown on the display as a two-line summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the input ends, the data is invalid, or any step
    /// of the commit fails.
    pub async fn enroll<I: OperatorInput>(
        &self,
        peripherals: &mut Peripherals,
        input: &mut I,
    ) -> SessionResult<Enrolled> {
        let span = info_span!("enroll", session_id = %Uuid::new_v4());
        async {
            let result = match self.collect(peripherals, input).await {
                Ok(draft) => self.commit(peripherals, &draft).await,
                Err(e) => Err(e),
            };

            if let Err(e) = &result {
                error!("Enrollment aborted: {}", e);
                if !matches!(e, SessionError::InputClosed) {
                    show_error(peripherals, e, self.timing.notice_hold()).await;
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn collect<I: OperatorInput>(
        &self,
        peripherals: &mut Peripherals,
        input: &mut I,
    ) -> SessionResult<EnrollmentDraft> {
        let display = &mut peripherals.display;
        display
            .show(
                DisplayMessages::NEW_USER,
                DisplayMessages::ENTER_DATA,
                true,
                Duration::ZERO,
            )
            .await;

        let name = require_line(input, "Name of the new user: ").await?;
        display
            .show(DisplayMessages::NAME, &name, true, Duration::ZERO)
            .await;

        let prompt = format!("Key for {}: ", name.trim());
        let credential = require_line(input, &prompt).await?;
        let columns = display.columns();
        display
            .show(
                &messages::key_for(name.trim(), columns),
                &credential,
                true,
                Duration::ZERO,
            )
            .await;

        let draft = EnrollmentDraft::new(&name, credential)?;
        require_line(input, "Press Enter to take the photo...").await?;
        Ok(draft)
    }

    /// Capture, store the photo, and create the identity.
    ///
    /// # Errors
    ///
    /// Returns the capture, write or store error that stopped the
    /// enrollment. A store error removes the photo that was just written.
    pub async fn commit(
        &self,
        peripherals: &mut Peripherals,
        draft: &EnrollmentDraft,
    ) -> SessionResult<Enrolled> {
        peripherals
            .display
            .show(
                DisplayMessages::TAKING_PHOTO,
                DisplayMessages::PLEASE_WAIT,
                true,
                Duration::ZERO,
            )
            .await;
        let photo = self.camera.capture().await?;
        debug!("Captured {} bytes", photo.bytes.len());

        let filename = photo_filename(&draft.name, Local::now().naive_local(), photo.extension);
        let relative = relative_photo_path(&self.paths.photos_dir, &filename);
        let absolute = self.paths.resolve(&relative);
        write_photo(&self.paths.photos_path(), &absolute, &photo).await?;
        info!("Photo saved to {}", absolute.display());
        peripherals
            .display
            .show(
                DisplayMessages::PHOTO_SAVED,
                "",
                true,
                self.timing.notice_hold(),
            )
            .await;

        let photo_path = relative.to_string_lossy().into_owned();
        let record = NewIdentity::new(
            draft.name.clone(),
            draft.credential.clone(),
            photo_path.clone(),
        );
        match self.identities.create(&record).await {
            Ok(id) => {
                info!("Enrolled {} (id {})", draft.name, id);
                peripherals
                    .display
                    .show(
                        &messages::user(draft.name.as_str()),
                        DisplayMessages::REGISTERED,
                        true,
                        self.timing.notice_hold(),
                    )
                    .await;
                peripherals.display.clear().await;
                Ok(Enrolled { id, photo_path })
            }
            Err(e) => {
                peripherals
                    .display
                    .show(
                        DisplayMessages::DB_ERROR,
                        DisplayMessages::REGISTER_FAILED,
                        true,
                        self.timing.notice_hold(),
                    )
                    .await;
                remove_photo(&absolute).await;
                Err(e.into())
            }
        }
    }
}

async fn write_photo(dir: &Path, path: &Path, photo: &CapturedPhoto) -> SessionResult<()> {
    tokio::fs::create_dir_all(dir).await?;
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    if let Err(e) = write_all_synced(&mut file, &photo.bytes).await {
        drop(file);
        remove_photo(path).await;
        return Err(e.into());
    }
    Ok(())
}

async fn write_all_synced(file: &mut tokio::fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Best-effort removal; a failure is logged and swallowed.
async fn remove_photo(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) => warn!("Could not remove {}: {}", path.display(), e),
    }
}
