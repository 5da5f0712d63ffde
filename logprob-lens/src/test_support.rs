use std::sync::{Mutex, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Puts the saved values back on drop, including when the closure panics.
struct EnvRestore {
    backup: Vec<(String, Option<String>)>,
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, value) in &self.backup {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

pub fn with_env(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
    let _lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let _restore = EnvRestore {
        backup: vars
            .iter()
            .map(|(key, _)| ((*key).to_string(), std::env::var(key).ok()))
            .collect(),
    };
    for (key, value) in vars {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
    f();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::catch_unwind;

    const KEY: &str = "LOGPROB_LENS_TEST_SUPPORT_VAR";

    #[test]
    fn panicking_closure_restores_env_and_keeps_lock_usable() {
        std::env::remove_var(KEY);
        let result = catch_unwind(|| {
            with_env(&[(KEY, Some("inside"))], || panic!("closure failed"));
        });
        assert!(result.is_err());
        assert!(std::env::var(KEY).is_err());

        with_env(&[(KEY, Some("after"))], || {
            assert_eq!(std::env::var(KEY).as_deref(), Ok("after"));
        });
        assert!(std::env::var(KEY).is_err());
    }
}
