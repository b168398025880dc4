//! Async wrappers that run the codec on tokio's blocking pool.
//!
//! Each call moves its inputs to a blocking task and returns exactly what the
//! synchronous function of the same name would. A call cannot be cancelled
//! once the task has started.

use tokio::task;

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::mapper::PlistObject;
use crate::settings::Settings;

async fn run_blocking<T, F>(job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    task::spawn_blocking(job)
        .await
        .map_err(|e| Error::Task(e.to_string()))?
}

/// See [`crate::load`].
pub async fn load(input: Vec<u8>, settings: Settings) -> Result<Dictionary> {
    run_blocking(move || crate::load(&input, &settings)).await
}

/// See [`crate::save`].
pub async fn save(dict: Dictionary) -> Result<Vec<u8>> {
    run_blocking(move || crate::save(&dict)).await
}

/// See [`crate::deserialize`].
pub async fn deserialize<T>(input: Vec<u8>, settings: Settings) -> Result<T>
where
    T: PlistObject + Send,
{
    run_blocking(move || crate::deserialize::<T>(&input, &settings)).await
}

/// See [`crate::serialize`].
pub async fn serialize<T>(object: T, settings: Settings) -> Result<Vec<u8>>
where
    T: PlistObject + Send,
{
    run_blocking(move || crate::serialize(&object, &settings)).await
}
