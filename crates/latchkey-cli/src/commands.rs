//! Subcommands.

use anyhow::{Context, Result};
use latchkey_capture::{ExternalViewer, HttpCamera};
use latchkey_controller::messages::DisplayMessages;
use latchkey_controller::{AccessController, EnrollmentSession};
use latchkey_core::LatchkeyConfig;
use latchkey_hardware::{DisplayPort, Peripherals};
use latchkey_storage::{Database, DatabaseConfig, IdentityRepository, SqliteIdentityRepository};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::app::App;
use crate::input::StdinInput;
use crate::shutdown::until_signal;

const FATAL_NOTICE_HOLD: Duration = Duration::from_secs(3);

/// How the interactive menu ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The operator chose exit or the input ended.
    Finished,
    /// A shutdown signal arrived. Hardware has been released.
    Interrupted,
}

/// Create the photos directory and the database schema.
pub async fn init_db(config: &LatchkeyConfig) -> Result<Database> {
    let photos = config.paths.photos_path();
    if !photos.is_dir() {
        tokio::fs::create_dir_all(&photos)
            .await
            .with_context(|| format!("Cannot create photos directory {}", photos.display()))?;
        info!("Created photos directory {}", photos.display());
    }

    let path = config.paths.database_path();
    let db = Database::new(DatabaseConfig::new(&path))
        .await
        .with_context(|| format!("Cannot open database {}", path.display()))?;
    info!("Database ready at {}", path.display());
    Ok(db)
}

/// Interactive menu.
///
/// A shutdown signal abandons the current session (an open latch is closed
/// as it is dropped) and then releases the hardware as on a normal exit.
pub async fn run(config: &LatchkeyConfig) -> Result<RunOutcome> {
    let db = init_db(config).await?;

    let mut peripherals = match Peripherals::acquire(config).await {
        Ok(peripherals) => peripherals,
        Err(e) => {
            error!("Actuator initialization failed: {}", e);
            let mut display = DisplayPort::open(&config.display).await;
            display
                .show(
                    DisplayMessages::SERVO_ERROR,
                    DisplayMessages::EXITING,
                    true,
                    FATAL_NOTICE_HOLD,
                )
                .await;
            return Err(e).context("Cannot initialize the door actuator");
        }
    };
    if peripherals.display.is_simulated() {
        warn!("No LCD in use; display output goes to the log");
    }

    let identities = SqliteIdentityRepository::new(db.pool().clone());
    info!("{} identities enrolled", identities.count().await?);

    let camera = HttpCamera::from_config(&config.camera).context("Invalid camera settings")?;
    let mut app = App::new(
        AccessController::new(
            identities.clone(),
            ExternalViewer::from_config(&config.viewer),
            config.paths.clone(),
            config.session.clone(),
        ),
        EnrollmentSession::new(
            identities,
            camera,
            config.paths.clone(),
            config.session.clone(),
        ),
        config.session.clone(),
    );

    let mut input = StdinInput::new();
    let finished = until_signal(app.run(&mut peripherals, &mut input)).await;

    peripherals.shutdown().await;
    db.close().await;
    println!("Resources released.");
    match finished {
        Some(result) => result
            .map(|()| RunOutcome::Finished)
            .context("Menu loop failed"),
        None => Ok(RunOutcome::Interrupted),
    }
}

/// Exercise the display and the actuator once.
pub async fn self_test(config: &LatchkeyConfig) -> Result<()> {
    let mut peripherals = Peripherals::acquire(config)
        .await
        .context("Cannot initialize the door actuator")?;

    if let Some(info) = peripherals.display.info().await {
        println!("Display: {} ({})", info.name, info.model);
    }
    if let Some(info) = peripherals.actuator.info().await {
        println!("Actuator: {} ({})", info.name, info.model);
    }

    let finished = until_signal(exercise(&mut peripherals)).await.is_some();

    peripherals.shutdown().await;
    if finished {
        println!("Self-test finished.");
    } else {
        println!("Self-test interrupted.");
    }
    Ok(())
}

async fn exercise(peripherals: &mut Peripherals) {
    let display = &mut peripherals.display;
    display
        .show("Testing LCD...", "Line 2 test", true, Duration::from_secs(2))
        .await;
    display.clear().await;
    display
        .show("LCD OK!", "", true, Duration::from_secs(1))
        .await;

    println!("Opening latch");
    let latch = peripherals.actuator.open_guarded().await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    println!("Closing latch");
    latch.close().await;
    tokio::time::sleep(Duration::from_secs(1)).await;
}
