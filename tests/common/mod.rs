#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use drowsewatch_lib::analysis::{AnalysisConfig, DrowsinessEngine, LandmarkIndices};
use drowsewatch_lib::models::{EventKind, EventRecord, Point, Sample, Session, SessionSummary};
use drowsewatch_lib::store::{SessionStore, StoreError};

pub const OPEN_EAR: f64 = 0.30;
pub const CLOSED_EAR: f64 = 0.15;
pub const MOUTH_SHUT: f64 = 0.01;
pub const MOUTH_WIDE: f64 = 0.08;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
}

/// Capture time of frame `frame` at `fps`, truncated to whole milliseconds.
pub fn frame_time(frame: i64, fps: i64) -> DateTime<Utc> {
    base_time() + Duration::milliseconds(frame * 1000 / fps)
}

fn place_eye(points: &mut [Point], indices: &[usize; 6], center_x: f64, ear: f64) {
    let width = 0.1;
    let half_height = ear * width / 2.0;
    let y = 0.4;
    points[indices[0]] = Point::new(center_x - width / 2.0, y);
    points[indices[1]] = Point::new(center_x - 0.02, y + half_height);
    points[indices[2]] = Point::new(center_x + 0.02, y + half_height);
    points[indices[3]] = Point::new(center_x + width / 2.0, y);
    points[indices[4]] = Point::new(center_x + 0.02, y - half_height);
    points[indices[5]] = Point::new(center_x - 0.02, y - half_height);
}

/// A full landmark set whose eyes have aspect ratio `ear` and whose lips are
/// `mouth` apart.
pub fn face(ear: f64, mouth: f64) -> Vec<Point> {
    let indices = LandmarkIndices::default();
    let mut points = vec![Point::new(0.5, 0.5); indices.required_len()];
    place_eye(&mut points, &indices.left_eye, 0.3, ear);
    place_eye(&mut points, &indices.right_eye, 0.7, ear);
    let [upper, lower] = indices.mouth;
    points[upper] = Point::new(0.5, 0.7);
    points[lower] = Point::new(0.5, 0.7 + mouth);
    points
}

pub fn sample(frame: i64, ear: f64, mouth: f64) -> Sample {
    Sample::new(frame_time(frame, 30), face(ear, mouth))
}

/// Feeds frames `range` at 30 fps, with eye and mouth openness chosen per
/// frame, and returns every (frame, kind) the engine classified.
pub fn drive<F>(
    engine: &mut DrowsinessEngine,
    range: std::ops::Range<i64>,
    mut shape: F,
) -> Vec<(i64, EventKind)>
where
    F: FnMut(i64) -> (f64, f64),
{
    let mut fired = Vec::new();
    for frame in range {
        let (ear, mouth) = shape(frame);
        let outcome = engine
            .process(&sample(frame, ear, mouth))
            .expect("synthetic sample is valid");
        fired.extend(outcome.events.iter().map(|event| (frame, event.kind)));
    }
    fired
}

pub fn engine() -> DrowsinessEngine {
    DrowsinessEngine::new(AnalysisConfig::default())
}

pub fn kinds_of(fired: &[(i64, EventKind)], kind: EventKind) -> Vec<i64> {
    fired
        .iter()
        .filter(|(_, k)| *k == kind)
        .map(|(frame, _)| *frame)
        .collect()
}

/// In-memory store that records every call.
#[derive(Default)]
pub struct RecordingStore {
    pub conflict_with: Option<String>,
    pub fail_everything: bool,
    pub fail_finalize: bool,
    pub creates: AtomicUsize,
    pub appended: Mutex<Vec<EventRecord>>,
    pub finalized: Mutex<Vec<(String, SessionSummary)>>,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail_everything: true,
            ..Self::default()
        }
    }

    pub fn with_active(id: &str) -> Self {
        Self {
            conflict_with: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn appended(&self) -> Vec<EventRecord> {
        self.appended.lock().unwrap().clone()
    }

    pub fn finalized(&self) -> Vec<(String, SessionSummary)> {
        self.finalized.lock().unwrap().clone()
    }

    fn outage() -> StoreError {
        StoreError::Transport("connection refused".into())
    }
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn create_session(&self) -> Result<String, StoreError> {
        let call = self.creates.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_everything {
            return Err(Self::outage());
        }
        match &self.conflict_with {
            Some(id) => Err(StoreError::SessionAlreadyActive { id: id.clone() }),
            None => Ok(format!("session-{}", call + 1)),
        }
    }

    async fn append_event(&self, record: &EventRecord) -> Result<(), StoreError> {
        if self.fail_everything {
            return Err(Self::outage());
        }
        self.appended.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn finalize_session(
        &self,
        session_id: &str,
        summary: &SessionSummary,
    ) -> Result<(), StoreError> {
        if self.fail_everything || self.fail_finalize {
            return Err(Self::outage());
        }
        self.finalized
            .lock()
            .unwrap()
            .push((session_id.to_string(), summary.clone()));
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        Ok(Vec::new())
    }

    async fn get_session(&self, session_id: &str) -> Result<Session, StoreError> {
        Err(StoreError::Rejected {
            status: 404,
            message: format!("session {session_id} not found"),
        })
    }
}
