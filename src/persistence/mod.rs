use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::TurtleError;
use crate::models::StrategyState;

/// JSON file persistence for the strategy's net position and entry price
///
/// File format: `{ "position": <int>, "last_price": <float|null> }`.
/// `null` marks a flat position; a `NaN` placeholder is not accepted.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state, or a flat state if no file exists yet
    pub fn load(&self) -> Result<StrategyState, TurtleError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No state file at {}, starting flat", self.path.display());
                return Ok(StrategyState::flat());
            }
            Err(source) => {
                return Err(TurtleError::StateIo {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let state: StrategyState =
            serde_json::from_str(&contents).map_err(|source| TurtleError::StateFormat {
                path: self.path.clone(),
                source,
            })?;

        if !state.is_flat() && state.last_price.is_none() {
            tracing::warn!(
                "State file {} holds position {} without an entry price; pyramiding and stop-loss disabled until the next entry",
                self.path.display(),
                state.position
            );
        }

        Ok(state.normalized())
    }

    /// Save the state atomically (write to a sibling temp file, then rename)
    pub fn save(&self, state: &StrategyState) -> Result<(), TurtleError> {
        let io_err = |source| TurtleError::StateIo {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_string(state).map_err(|source| TurtleError::StateFormat {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        tracing::debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}
