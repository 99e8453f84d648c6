use shared::{
    domain::{Matter, MatterId, MatterStatus},
    error::ApiError,
    protocol::CreateMatterRequest,
};
use storage::{NewMatter, Storage};
use tracing::info;

const MAX_MATTER_NAME_BYTES: usize = 200;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_matters(ctx: &ApiContext) -> Result<Vec<Matter>, ApiError> {
    ctx.storage.list_matters().await.map_err(internal)
}

pub async fn get_matter(ctx: &ApiContext, matter_id: MatterId) -> Result<Matter, ApiError> {
    ctx.storage
        .get_matter(matter_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| matter_not_found(matter_id))
}

pub async fn create_matter(
    ctx: &ApiContext,
    request: CreateMatterRequest,
) -> Result<Matter, ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("matter name cannot be empty"));
    }
    if name.len() > MAX_MATTER_NAME_BYTES {
        return Err(ApiError::validation("matter name is too long"));
    }

    let matter_id = ctx
        .storage
        .create_matter(&NewMatter {
            name: name.to_string(),
            number: non_blank(request.number),
            client_name: non_blank(request.client_name),
            status: request.status,
        })
        .await
        .map_err(internal)?;
    info!(matter_id = %matter_id, "matter created");
    get_matter(ctx, matter_id).await
}

/// Persists only the status column of one matter.
pub async fn update_matter_status(
    ctx: &ApiContext,
    matter_id: MatterId,
    status: MatterStatus,
) -> Result<Matter, ApiError> {
    let matter = ctx
        .storage
        .update_matter_status(matter_id, status)
        .await
        .map_err(internal)?
        .ok_or_else(|| matter_not_found(matter_id))?;
    info!(matter_id = %matter_id, %status, "matter status updated");
    Ok(matter)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn matter_not_found(matter_id: MatterId) -> ApiError {
    ApiError::not_found(format!("matter {matter_id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(format!("{err:#}"))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
