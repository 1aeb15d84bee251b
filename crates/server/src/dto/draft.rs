use bandobast::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDto {
    pub layer_id: LayerId,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitDto {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftDto {
    pub state: SessionState,
    pub draft: DraftSector,
    pub notice: Option<Notice>,
}

impl DraftDto {
    /// Current form state. Hands out the pending notice, so it is shown once.
    pub fn take(session: &mut DrawSession) -> Self {
        let notice = session.take_notice();
        Self {
            state: session.state(),
            draft: session.draft().clone(),
            notice,
        }
    }
}
