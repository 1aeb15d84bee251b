use serde::{Deserialize, Serialize};

/// Icon used for personnel markers and drawn markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcon {
    pub url: String,
    pub size: (u32, u32),
    pub anchor: (u32, u32),
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            url: "maps-flags_447031.png".into(),
            size: (32, 32),
            anchor: (16, 32),
        }
    }
}

pub struct Config {
    pub sectors_path: String,
    pub personnel_path: String,
    pub marker_icon: MarkerIcon,
}

impl Config {
    pub fn personnel_record_path(&self, id: &str) -> String {
        format!("{}/{}", self.personnel_path, id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sectors_path: "sectorDetails".into(),
            personnel_path: "personnel".into(),
            marker_icon: MarkerIcon::default(),
        }
    }
}
