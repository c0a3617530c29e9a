//! Geometric features from one landmark set.

use thiserror::Error;

use super::config::LandmarkIndices;
use crate::models::Point;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("sample carries {actual} landmarks, {required} required")]
    TooFewLandmarks { required: usize, actual: usize },
    #[error("eye landmarks collapse horizontally; aspect ratio undefined")]
    DegenerateEye,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeFeature {
    pub ear: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouthFeature {
    pub aperture: f64,
}

/// Everything the state machines consume from a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFeatures {
    pub left_eye: EyeFeature,
    pub right_eye: EyeFeature,
    pub mouth: MouthFeature,
}

impl FaceFeatures {
    pub fn avg_ear(&self) -> f64 {
        (self.left_eye.ear + self.right_eye.ear) / 2.0
    }

    pub fn mouth_aperture(&self) -> f64 {
        self.mouth.aperture
    }
}

/// Eye aspect ratio: (|p1-p5| + |p2-p4|) / (2 |p0-p3|).
pub fn eye_aspect_ratio(eye: &[Point; 6]) -> Result<f64, SampleError> {
    let vertical_a = eye[1].distance(&eye[5]);
    let vertical_b = eye[2].distance(&eye[4]);
    let horizontal = eye[0].distance(&eye[3]);

    if horizontal <= f64::EPSILON {
        return Err(SampleError::DegenerateEye);
    }

    Ok((vertical_a + vertical_b) / (2.0 * horizontal))
}

pub fn extract(
    landmarks: &[Point],
    indices: &LandmarkIndices,
) -> Result<FaceFeatures, SampleError> {
    let required = indices.required_len();
    if landmarks.len() < required {
        return Err(SampleError::TooFewLandmarks {
            required,
            actual: landmarks.len(),
        });
    }

    let pick = |positions: &[usize; 6]| positions.map(|index| landmarks[index]);

    let left_eye = EyeFeature {
        ear: eye_aspect_ratio(&pick(&indices.left_eye))?,
    };
    let right_eye = EyeFeature {
        ear: eye_aspect_ratio(&pick(&indices.right_eye))?,
    };
    let [upper, lower] = indices.mouth;
    let mouth = MouthFeature {
        aperture: landmarks[upper].distance(&landmarks[lower]),
    };

    Ok(FaceFeatures {
        left_eye,
        right_eye,
        mouth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye(height: f64) -> [Point; 6] {
        [
            Point::new(0.0, 0.0),
            Point::new(0.3, height / 2.0),
            Point::new(0.7, height / 2.0),
            Point::new(1.0, 0.0),
            Point::new(0.7, -height / 2.0),
            Point::new(0.3, -height / 2.0),
        ]
    }

    #[test]
    fn ear_is_height_over_width() {
        let ear = eye_aspect_ratio(&eye(0.3)).unwrap();
        assert!((ear - 0.3).abs() < 1e-9);
    }

    #[test]
    fn rejects_short_landmark_sets() {
        let landmarks = vec![Point::new(0.0, 0.0); 100];
        let err = extract(&landmarks, &LandmarkIndices::default()).unwrap_err();
        assert_eq!(
            err,
            SampleError::TooFewLandmarks {
                required: 388,
                actual: 100
            }
        );
    }

    #[test]
    fn rejects_collapsed_eye() {
        let landmarks = vec![Point::new(0.5, 0.5); 400];
        let err = extract(&landmarks, &LandmarkIndices::default()).unwrap_err();
        assert_eq!(err, SampleError::DegenerateEye);
    }

    #[test]
    fn averages_both_eyes_and_measures_lips() {
        let indices = LandmarkIndices::default();
        let mut landmarks = vec![Point::new(0.0, 0.0); indices.required_len()];
        for (slot, point) in indices.left_eye.iter().zip(eye(0.2)) {
            landmarks[*slot] = point;
        }
        for (slot, point) in indices.right_eye.iter().zip(eye(0.4)) {
            landmarks[*slot] = point;
        }
        landmarks[indices.mouth[0]] = Point::new(0.5, 0.6);
        landmarks[indices.mouth[1]] = Point::new(0.5, 0.68);

        let features = extract(&landmarks, &indices).unwrap();
        assert!((features.avg_ear() - 0.3).abs() < 1e-9);
        assert!((features.mouth_aperture() - 0.08).abs() < 1e-9);
    }
}
