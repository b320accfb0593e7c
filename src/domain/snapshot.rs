// View snapshot domain model - what the rendering layer consumes
use super::reading::ReadingSeries;
use serde::Serialize;

/// Per-region slice of the view snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RegionView {
    pub id: String,
    pub name: String,
    pub color: String,
    pub readings: ReadingSeries,
    pub loading: bool,
}

/// Stable view-facing state assembled from the synchronization core.
///
/// Region entries follow registry order. A region with no committed series
/// yet appears with an empty series rather than being omitted.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub regions: Vec<RegionView>,
    pub selected_region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub seconds_until_refresh: u64,
}
