//! Secret repository port.
//!
//! Raw values stay inside the application; HTTP handlers only ever see a
//! [`SecretStatus`](dunning_domain::secret::SecretStatus).

use std::future::Future;
use std::sync::Arc;

use dunning_domain::error::DunningError;

/// Storage for named secrets such as third-party API keys.
pub trait SecretRepository {
    /// Read a secret. Blank values read as `None`.
    fn get_secret(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, DunningError>> + Send;

    /// Store a secret, replacing any previous value.
    fn set_secret(
        &self,
        name: &str,
        value: String,
    ) -> impl Future<Output = Result<(), DunningError>> + Send;
}

impl<T: SecretRepository + Send + Sync> SecretRepository for Arc<T> {
    fn get_secret(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, DunningError>> + Send {
        (**self).get_secret(name)
    }

    fn set_secret(
        &self,
        name: &str,
        value: String,
    ) -> impl Future<Output = Result<(), DunningError>> + Send {
        (**self).set_secret(name, value)
    }
}
