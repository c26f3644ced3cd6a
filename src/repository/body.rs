//! Body metrics and progress photos.

use super::{fetch, fetch_all, insert, remove, replace, RepositoryError};
use crate::models::{BodyMetric, Photo, ValidationErrors};
use crate::storage::Database;
use crate::store::OrderSpec;

pub struct BodyMetricRepository<'a> {
    db: &'a Database,
    owner: &'a str,
}

impl<'a> BodyMetricRepository<'a> {
    pub fn new(db: &'a Database, owner: &'a str) -> Self {
        Self { db, owner }
    }

    /// Store an entry, deriving its BMI when a height in cm is given.
    pub fn add(
        &self,
        metric: &mut BodyMetric,
        height_cm: Option<f64>,
    ) -> Result<String, RepositoryError> {
        validate_metric(metric)?;
        if let Some(height) = height_cm {
            *metric = metric.clone().with_height(height);
        }
        insert(self.db, self.owner, metric)
    }

    /// All entries, newest first.
    pub fn list(&self) -> Result<Vec<BodyMetric>, RepositoryError> {
        fetch_all(self.db, self.owner, Some(&OrderSpec::desc("date")))
    }

    pub fn latest(&self) -> Result<Option<BodyMetric>, RepositoryError> {
        Ok(self.list()?.into_iter().next())
    }

    pub fn update(&self, metric: &BodyMetric) -> Result<(), RepositoryError> {
        validate_metric(metric)?;
        replace(self.db, self.owner, metric)
    }

    pub fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        remove::<BodyMetric>(self.db, self.owner, id)
    }
}

pub struct PhotoRepository<'a> {
    db: &'a Database,
    owner: &'a str,
}

impl<'a> PhotoRepository<'a> {
    pub fn new(db: &'a Database, owner: &'a str) -> Self {
        Self { db, owner }
    }

    pub fn add(&self, photo: &mut Photo) -> Result<String, RepositoryError> {
        validate_photo(photo)?;
        insert(self.db, self.owner, photo)
    }

    /// All photos, newest first.
    pub fn list(&self) -> Result<Vec<Photo>, RepositoryError> {
        fetch_all(self.db, self.owner, Some(&OrderSpec::desc("date")))
    }

    pub fn get(&self, id: &str) -> Result<Option<Photo>, RepositoryError> {
        fetch(self.db, self.owner, id)
    }

    pub fn update(&self, photo: &Photo) -> Result<(), RepositoryError> {
        validate_photo(photo)?;
        replace(self.db, self.owner, photo)
    }

    pub fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        remove::<Photo>(self.db, self.owner, id)
    }
}

fn validate_metric(metric: &BodyMetric) -> Result<(), RepositoryError> {
    let m = &metric.measurements;
    let values = [metric.weight, metric.body_fat, m.chest, m.waist, m.arms, m.legs];
    if values.iter().any(|v| *v < 0.0) {
        let mut errors = ValidationErrors::default();
        errors.push("Measurements cannot be negative");
        return Err(errors.into());
    }
    Ok(())
}

fn validate_photo(photo: &Photo) -> Result<(), RepositoryError> {
    if photo.image_url.trim().is_empty() {
        let mut errors = ValidationErrors::default();
        errors.push("Photo image is required");
        return Err(errors.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn test_latest_metric_is_newest() {
        let db = Database::open_in_memory().unwrap();
        let repo = BodyMetricRepository::new(&db, "u1");

        repo.add(&mut BodyMetric::new(82.0).on(date(1)), None).unwrap();
        repo.add(&mut BodyMetric::new(80.0).on(date(20)), Some(180.0)).unwrap();
        repo.add(&mut BodyMetric::new(81.0).on(date(10)), None).unwrap();

        let latest = repo.latest().unwrap().unwrap();
        assert_eq!(latest.weight, 80.0);
        assert!((latest.bmi - 24.7).abs() < 1e-9);
        assert_eq!(repo.list().unwrap().len(), 3);
    }

    #[test]
    fn test_latest_metric_empty() {
        let db = Database::open_in_memory().unwrap();
        assert!(BodyMetricRepository::new(&db, "u1").latest().unwrap().is_none());
    }

    #[test]
    fn test_photo_requires_image() {
        let db = Database::open_in_memory().unwrap();
        let repo = PhotoRepository::new(&db, "u1");

        assert!(matches!(
            repo.add(&mut Photo::new("")),
            Err(RepositoryError::Validation(_))
        ));

        let mut photo = Photo::new("file:///photos/front.jpg").on(date(3)).with_notes("Front");
        let id = repo.add(&mut photo).unwrap();
        assert_eq!(repo.get(&id).unwrap(), Some(photo));
    }

    #[test]
    fn test_update_rejects_negative_measurements() {
        let db = Database::open_in_memory().unwrap();
        let repo = BodyMetricRepository::new(&db, "u1");
        let mut metric = BodyMetric::new(80.0).on(date(1));
        repo.add(&mut metric, None).unwrap();

        let mut broken = metric.clone();
        broken.weight = -1.0;
        assert!(matches!(repo.update(&broken), Err(RepositoryError::Validation(_))));

        let mut broken = metric.clone();
        broken.measurements.waist = -0.5;
        assert!(matches!(repo.update(&broken), Err(RepositoryError::Validation(_))));

        assert_eq!(repo.latest().unwrap(), Some(metric));
    }

    #[test]
    fn test_update_requires_photo_image() {
        let db = Database::open_in_memory().unwrap();
        let repo = PhotoRepository::new(&db, "u1");
        let mut photo = Photo::new("file:///photos/side.jpg").on(date(2));
        let id = repo.add(&mut photo).unwrap();

        let mut blank = photo.clone();
        blank.image_url = "  ".to_string();
        assert!(matches!(repo.update(&blank), Err(RepositoryError::Validation(_))));
        assert_eq!(repo.get(&id).unwrap(), Some(photo));
    }
}
