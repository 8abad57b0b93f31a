//! Shortcut registry use case
//!
//! Single owner of global hotkey registration. Tracks which bindings the
//! engine currently has registered and reports conflicts per binding.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::ports::{EngineError, ShortcutEngine};
use crate::domain::shortcut::{
    canonicalize, validate_accelerator, RegistrationResult, ShortcutBinding, ShortcutConflict,
};

#[derive(Debug, Default)]
struct RegistryState {
    bindings: Vec<ShortcutBinding>,
    /// Bindings taken offline by `suspend_all`, until `restore`
    suspended: Option<Vec<ShortcutBinding>>,
}

impl RegistryState {
    /// Id holding `accelerator`, counting suspended bindings as still held
    fn holder_of(&self, accelerator: &str, except_id: &str) -> Option<String> {
        let live = self.bindings.iter().filter(|b| b.registered);
        let parked = self.suspended.iter().flatten();
        live.chain(parked)
            .find(|b| b.id != except_id && canonicalize(&b.accelerator) == accelerator)
            .map(|b| b.id.clone())
    }

    fn upsert(&mut self, binding: ShortcutBinding) {
        match self.bindings.iter_mut().find(|b| b.id == binding.id) {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
    }

    fn mark(&mut self, id: &str, registered: bool) {
        if let Some(binding) = self.bindings.iter_mut().find(|b| b.id == id) {
            binding.registered = registered;
        }
    }
}

/// Owns the persisted bindings and their registration status
pub struct ShortcutRegistry<E: ShortcutEngine> {
    engine: E,
    state: Mutex<RegistryState>,
}

impl<E: ShortcutEngine> ShortcutRegistry<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Replace the known bindings (all start unregistered)
    pub async fn load(&self, bindings: Vec<ShortcutBinding>) {
        let mut state = self.state.lock().await;
        state.bindings = bindings
            .into_iter()
            .map(|mut b| {
                b.registered = false;
                b
            })
            .collect();
    }

    /// All known bindings, in load order
    pub async fn bindings(&self) -> Vec<ShortcutBinding> {
        self.state.lock().await.bindings.clone()
    }

    pub async fn binding(&self, id: &str) -> Option<ShortcutBinding> {
        self.state
            .lock()
            .await
            .bindings
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    /// Bindings the engine currently has registered
    pub async fn registered(&self) -> Vec<ShortcutBinding> {
        self.state
            .lock()
            .await
            .bindings
            .iter()
            .filter(|b| b.registered)
            .cloned()
            .collect()
    }

    /// Mark what the engine already holds as registered.
    ///
    /// Used when another client registered the bindings. Returns how many
    /// the engine reported.
    pub async fn sync_with_engine(&self) -> Result<usize, EngineError> {
        let live = self.engine.list_registered_shortcuts().await?;
        let mut state = self.state.lock().await;
        for binding in &live {
            state.upsert(ShortcutBinding {
                registered: true,
                ..binding.clone()
            });
        }
        debug!(count = live.len(), "Adopted engine registrations");
        Ok(live.len())
    }

    pub async fn is_suspended(&self) -> bool {
        self.state.lock().await.suspended.is_some()
    }

    /// Register every known binding. One failure never blocks the others.
    pub async fn register_all(&self) -> Vec<RegistrationResult> {
        let bindings = self.bindings().await;
        let mut results = Vec::with_capacity(bindings.len());
        for binding in bindings {
            results.push(self.try_register(binding).await);
        }
        results
    }

    /// Validate and register one binding.
    ///
    /// Refuses an accelerator another binding already holds, then asks the
    /// engine. Engine refusals become conflicts with suggested alternatives.
    pub async fn try_register(&self, binding: ShortcutBinding) -> RegistrationResult {
        let accelerator = match validate_accelerator(&binding.accelerator) {
            Ok(accel) => accel.to_string(),
            Err(e) => {
                warn!(id = %binding.id, accelerator = %binding.accelerator, "Invalid shortcut: {e}");
                return RegistrationResult::Conflict(ShortcutConflict::invalid(
                    &binding.id,
                    &binding.accelerator,
                    &e,
                ));
            }
        };

        let previous = {
            let state = self.state.lock().await;
            if let Some(holder) = state.holder_of(&accelerator, &binding.id) {
                warn!(id = %binding.id, %accelerator, %holder, "Shortcut already in use");
                return RegistrationResult::Conflict(ShortcutConflict::held_by(
                    &binding.id,
                    &accelerator,
                    &holder,
                ));
            }
            state
                .bindings
                .iter()
                .find(|b| b.id == binding.id && b.registered)
                .map(|b| b.accelerator.clone())
        };

        if previous.as_deref() == Some(accelerator.as_str()) {
            debug!(id = %binding.id, %accelerator, "Shortcut already registered");
            return RegistrationResult::Registered {
                shortcut_id: binding.id,
                accelerator,
            };
        }

        if previous.is_some() {
            if let Err(e) = self.engine.unregister_shortcut(&binding.id).await {
                warn!(id = %binding.id, "Failed to unregister previous shortcut: {e}");
            }
            self.state.lock().await.mark(&binding.id, false);
        }

        let candidate = ShortcutBinding {
            accelerator: accelerator.clone(),
            registered: false,
            ..binding
        };

        match self.engine.register_shortcut(&candidate).await {
            Ok(()) => {
                info!(id = %candidate.id, %accelerator, "Shortcut registered");
                let id = candidate.id.clone();
                self.state.lock().await.upsert(ShortcutBinding {
                    registered: true,
                    ..candidate
                });
                RegistrationResult::Registered {
                    shortcut_id: id,
                    accelerator,
                }
            }
            Err(e) => {
                warn!(id = %candidate.id, %accelerator, "Shortcut registration failed: {e}");
                RegistrationResult::Conflict(ShortcutConflict::from_engine_error(
                    &candidate.id,
                    &accelerator,
                    e.message(),
                ))
            }
        }
    }

    /// Report whether an accelerator could be bound to `id` without registering it
    pub async fn check_available(&self, id: &str, accelerator: &str) -> Result<String, ShortcutConflict> {
        let canonical = validate_accelerator(accelerator)
            .map_err(|e| ShortcutConflict::invalid(id, accelerator, &e))?
            .to_string();
        match self.state.lock().await.holder_of(&canonical, id) {
            Some(holder) => Err(ShortcutConflict::held_by(id, &canonical, &holder)),
            None => Ok(canonical),
        }
    }

    /// Unregister one binding
    pub async fn unregister(&self, id: &str) -> Result<(), EngineError> {
        self.engine.unregister_shortcut(id).await?;
        self.state.lock().await.mark(id, false);
        info!(id, "Shortcut unregistered");
        Ok(())
    }

    /// Take every registered binding offline.
    ///
    /// Returns the bindings that were live, in registration order. Engine
    /// failures are logged: a binding may already be gone after an aborted
    /// capture.
    pub async fn suspend_all(&self) -> Vec<ShortcutBinding> {
        let snapshot = {
            let mut state = self.state.lock().await;
            let snapshot: Vec<ShortcutBinding> =
                state.bindings.iter().filter(|b| b.registered).cloned().collect();
            let mut parked = state.suspended.take().unwrap_or_default();
            parked.extend(snapshot.iter().cloned());
            state.suspended = Some(parked);
            for binding in &mut state.bindings {
                binding.registered = false;
            }
            snapshot
        };

        if let Err(e) = self.engine.unregister_all_shortcuts().await {
            warn!("Bulk unregister failed, falling back to one by one: {e}");
            for binding in &snapshot {
                if let Err(e) = self.engine.unregister_shortcut(&binding.id).await {
                    warn!(id = %binding.id, "Failed to unregister shortcut: {e}");
                }
            }
        }

        info!(count = snapshot.len(), "Shortcuts suspended");
        snapshot
    }

    /// Bring bindings back online, best-effort and in the given order
    pub async fn restore(&self, bindings: &[ShortcutBinding]) -> Vec<RegistrationResult> {
        self.state.lock().await.suspended = None;

        let mut results = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let result = self.try_register(binding.clone()).await;
            if let Some(conflict) = result.conflict() {
                warn!(id = %conflict.shortcut_id, "Failed to restore shortcut: {}", conflict.reason);
            }
            results.push(result);
        }
        info!(
            restored = results.iter().filter(|r| r.is_registered()).count(),
            "Shortcuts restored"
        );
        results
    }

    /// Align local registration flags with what the engine reports
    pub async fn sync(&self) -> Result<(), EngineError> {
        let live = self.engine.list_registered_shortcuts().await?;
        let mut state = self.state.lock().await;
        for binding in &mut state.bindings {
            binding.registered = live.iter().any(|l| {
                l.id == binding.id && canonicalize(&l.accelerator) == canonicalize(&binding.accelerator)
            });
        }
        Ok(())
    }

    /// Registrations as the engine sees them
    pub async fn engine_registered(&self) -> Result<Vec<ShortcutBinding>, EngineError> {
        self.engine.list_registered_shortcuts().await
    }
}
