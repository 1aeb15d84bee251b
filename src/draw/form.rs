use serde::Deserialize;
use thiserror::Error;

use crate::{
    sector::{DraftSector, PersonnelId},
    shared::{parse_form_date, parse_form_time},
};

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Invalid date {value:?}: {source}")]
    InvalidDate {
        value: String,
        source: chrono::ParseError,
    },
    #[error("Invalid time {value:?}: {source}")]
    InvalidTime {
        value: String,
        source: chrono::ParseError,
    },
}

/// Batch of field edits, `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormUpdate {
    pub title: Option<String>,
    pub personnel: Option<Vec<PersonnelId>>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Editor over the draft of the open form.
pub struct FormState<'a> {
    draft: &'a mut DraftSector,
}

impl<'a> FormState<'a> {
    pub(crate) fn new(draft: &'a mut DraftSector) -> Self {
        Self { draft }
    }

    pub fn draft(&self) -> &DraftSector {
        self.draft
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    /// Replaces the multi-select selection.
    pub fn set_personnel<I, T>(&mut self, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<PersonnelId>,
    {
        self.draft.personnel_ids = ids.into_iter().map(Into::into).collect();
    }

    /// Returns whether `id` is selected afterwards.
    pub fn toggle_personnel(&mut self, id: &str) -> bool {
        if self.draft.personnel_ids.remove(id) {
            false
        } else {
            self.draft.personnel_ids.insert(id.to_string());
            true
        }
    }

    pub fn set_date(&mut self, value: &str) -> Result<(), FormError> {
        self.draft.date = date(value)?;
        Ok(())
    }

    pub fn set_start_time(&mut self, value: &str) -> Result<(), FormError> {
        self.draft.start_time = time(value)?;
        Ok(())
    }

    pub fn set_end_time(&mut self, value: &str) -> Result<(), FormError> {
        self.draft.end_time = time(value)?;
        Ok(())
    }

    /// Applies every field of `update`, or none of them if any is malformed.
    pub fn apply(&mut self, update: FormUpdate) -> Result<(), FormError> {
        let date = update.date.as_deref().map(date).transpose()?;
        let start_time = update.start_time.as_deref().map(time).transpose()?;
        let end_time = update.end_time.as_deref().map(time).transpose()?;

        if let Some(title) = update.title {
            self.set_title(title);
        }
        if let Some(personnel) = update.personnel {
            self.set_personnel(personnel);
        }
        if let Some(date) = date {
            self.draft.date = date;
        }
        if let Some(start_time) = start_time {
            self.draft.start_time = start_time;
        }
        if let Some(end_time) = end_time {
            self.draft.end_time = end_time;
        }
        Ok(())
    }
}

fn date(value: &str) -> Result<Option<chrono::NaiveDate>, FormError> {
    parse_form_date(value).map_err(|source| FormError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

fn time(value: &str) -> Result<Option<chrono::NaiveTime>, FormError> {
    parse_form_time(value).map_err(|source| FormError::InvalidTime {
        value: value.to_string(),
        source,
    })
}
