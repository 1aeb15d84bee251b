//! Read-modify-write that turns an open draft into a stored sector.
//!
//! Personnel are resolved against the roster first, all reads running
//! concurrently. The single append at the end is the only write; nothing is
//! stored unless every read succeeded.

use futures_util::future::try_join_all;
use std::{collections::BTreeMap, time::Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::Config,
    draw::DrawnLayers,
    sector::{
        DeviceId, DraftSector, PersonnelId, PersonnelRecord, PersonnelSnapshot, SectorId,
        SectorRecord,
    },
    store::{self, RemoteStore},
};

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("No sector form is open")]
    FormClosed,
    #[error("Sector title is required")]
    MissingTitle,
    #[error("Failed to read personnel: {0}")]
    Read(#[source] store::Error),
    #[error("Personnel {0} not found")]
    PersonnelNotFound(PersonnelId),
    #[error("Personnel {id} is unreadable: {source}")]
    Decode {
        id: PersonnelId,
        source: serde_json::Error,
    },
    #[error("Personnel {0} has no device id")]
    MissingDeviceId(PersonnelId),
    #[error("Failed to encode sector: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to save sector: {0}")]
    Write(#[source] store::Error),
}

pub async fn submit_sector<S: RemoteStore>(
    store: &S,
    config: &Config,
    draft: &DraftSector,
    layers: &DrawnLayers,
) -> Result<SectorId, SubmitError> {
    if draft.title.trim().is_empty() {
        return Err(SubmitError::MissingTitle);
    }
    let rings = layers.uncommitted_rings();

    let now = Instant::now();
    let records = try_join_all(
        draft
            .personnel_ids
            .iter()
            .map(|id| resolve_personnel(store, config, id)),
    )
    .await?;
    debug!("Resolving {} personnel took {:?}", records.len(), now.elapsed());

    let personnel = snapshot_by_device(records)?;
    let record = SectorRecord::assemble(draft, &rings, personnel);
    let value = serde_json::to_value(&record)?;
    store
        .append_new(&config.sectors_path, value)
        .await
        .map_err(SubmitError::Write)
}

async fn resolve_personnel<S: RemoteStore>(
    store: &S,
    config: &Config,
    id: &str,
) -> Result<PersonnelRecord, SubmitError> {
    let path = config.personnel_record_path(id);
    let value = store
        .read_once(&path)
        .await
        .map_err(SubmitError::Read)?
        .ok_or_else(|| SubmitError::PersonnelNotFound(id.to_string()))?;
    PersonnelRecord::from_value(id.to_string(), value).map_err(|source| SubmitError::Decode {
        id: id.to_string(),
        source,
    })
}

/// Keys each snapshot by the device id of the fetched record rather than by
/// the roster key that was selected.
fn snapshot_by_device(
    records: Vec<PersonnelRecord>,
) -> Result<BTreeMap<DeviceId, PersonnelSnapshot>, SubmitError> {
    let mut personnel = BTreeMap::new();
    for record in records {
        let Some(device_id) = record.device_id.clone() else {
            return Err(SubmitError::MissingDeviceId(record.id));
        };
        if record.position.is_none() {
            warn!("Personnel {} has no position to capture", record.id);
        }
        personnel.insert(device_id, record.snapshot());
    }
    Ok(personnel)
}
