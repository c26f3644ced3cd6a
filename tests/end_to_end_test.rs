//! End-to-end tests: the application root on a database file.

use avance::auth::AuthError;
use avance::models::{BodyMetric, Exercise, StrengthSet, Workout};
use avance::repository::{BodyMetricRepository, DataTransfer, ExportBundle};
use avance::router::Navigator;
use avance::{App, AppConfig, AppError, WorkoutRepository};
use chrono::NaiveDate;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> AppConfig {
    AppConfig {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

fn log_squats(app: &App, day: u32, weight: f64) {
    let user = app.require_user().unwrap();
    WorkoutRepository::new(app.database(), &user.uid)
        .save_with_exercises(
            Workout::new("Strength").on(date(day)).with_duration(45),
            vec![Exercise::strength(
                "",
                "Squat",
                vec![StrengthSet::new(5, weight), StrengthSet::new(5, weight)],
            )],
        )
        .unwrap();
}

#[test]
fn test_full_session_flow() {
    let dir = TempDir::new().unwrap();
    let app = App::open(config_in(&dir)).unwrap();
    assert_eq!(app.router().current_path(), "/login");

    let user = app.register("ana@example.com", "secret1", Some("Ana")).unwrap();
    assert_eq!(app.router().current_path(), "/");
    assert_eq!(app.store().get_setting("units").as_deref(), Some("metric"));

    log_squats(&app, 1, 100.0);
    log_squats(&app, 2, 90.0);
    log_squats(&app, 3, 105.0);
    BodyMetricRepository::new(app.database(), &user.uid)
        .add(&mut BodyMetric::new(72.5).on(date(3)), Some(175.0))
        .unwrap();

    // The store mirrors every write.
    let dates: Vec<NaiveDate> = app.store().get_workouts().iter().map(|w| w.date).collect();
    assert_eq!(dates, vec![date(3), date(2), date(1)]);

    let summary = app.summary_on(date(3)).unwrap();
    assert_eq!(summary.workouts, 3);
    assert_eq!(summary.streak_days, 3);
    assert_eq!(summary.average_duration, 45);
    assert_eq!(summary.total_volume, 2950.0);
    // Weight 100, 105 and reps 5 once.
    assert_eq!(summary.personal_records, 3);
    assert_eq!(summary.latest_weight, Some(72.5));
    assert_eq!(summary.top_exercises, vec![("Squat".to_string(), 2950.0)]);

    app.logout();
    assert!(app.store().get_workouts().is_empty());
    assert!(matches!(
        app.export_json(),
        Err(AppError::Auth(AuthError::NotSignedIn))
    ));
}

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let app = App::open(config_in(&dir)).unwrap();
        app.register("ana@example.com", "secret1", None).unwrap();
        log_squats(&app, 10, 80.0);
        app.set_setting("theme", "light").unwrap();
        app.logout();
    }

    let app = App::open(config_in(&dir)).unwrap();
    assert!(matches!(
        app.login("ana@example.com", "nope-nope"),
        Err(AppError::Auth(AuthError::InvalidCredential))
    ));

    app.login("ana@example.com", "secret1").unwrap();
    assert_eq!(app.store().get_workouts().len(), 1);
    assert_eq!(app.store().get_setting("theme").as_deref(), Some("light"));
    assert_eq!(app.store().get_setting("weightUnit").as_deref(), Some("kg"));
}

#[test]
fn test_identities_do_not_see_each_other() {
    let dir = TempDir::new().unwrap();
    let app = App::open(config_in(&dir)).unwrap();

    app.register("ana@example.com", "secret1", None).unwrap();
    log_squats(&app, 1, 60.0);
    app.set_setting("theme", "light").unwrap();

    app.register("ben@example.com", "secret1", None).unwrap();
    assert!(app.store().get_workouts().is_empty());
    assert!(app.store().get_personal_records().is_empty());
    assert_eq!(app.store().get_setting("theme").as_deref(), Some("dark"));
}

#[test]
fn test_export_restores_into_fresh_account() {
    let dir = TempDir::new().unwrap();
    let app = App::open(config_in(&dir)).unwrap();

    app.register("ana@example.com", "secret1", None).unwrap();
    log_squats(&app, 1, 60.0);
    log_squats(&app, 2, 65.0);
    let json = app.export_json().unwrap();

    let bundle: ExportBundle = serde_json::from_str(&json).unwrap();
    assert_eq!(bundle.workouts.len(), 2);
    assert_eq!(bundle.exercises.len(), 2);
    assert!(bundle.export_date.is_some());

    let ben = app.register("ben@example.com", "secret1", None).unwrap();
    DataTransfer::new(app.database(), &ben.uid)
        .import_json(&json)
        .unwrap();

    assert_eq!(app.store().get_workouts().len(), 2);
    assert_eq!(
        app.store().get_personal_records().len(),
        bundle.personal_records.len()
    );
}
