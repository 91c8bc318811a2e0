//! Shared-password login and password change.

use edgex_transit::Value;

use crate::dispatch::{Args, HandlerError};

use super::context::Services;

pub(super) async fn login(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let password = args.string("password")?;
    services.credentials.verify(&password).await?;
    Ok(Value::Null)
}

pub(super) async fn change_password(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let current = args.string("oldpw")?;
    let new = args.string("newpw")?;
    services.credentials.change(&current, &new).await?;
    Ok(Value::Null)
}
