mod common;

use std::sync::Arc;

use common::service;
use player_roster::{
    application::{
        bulk_upload::{BulkUploader, RowVerdict},
        player_service::PlayerService,
    },
    domain::{error::RosterError, models::BulkUploadReport},
};

const HEADER: &str = "firstName,lastName,dateOfBirth,height,nationalities,positions";

fn uploader(max_rows: Option<usize>) -> (BulkUploader, Arc<PlayerService>) {
    let players = Arc::new(service());
    (BulkUploader::new(players.clone(), max_rows), players)
}

fn report(created: &[u64], failed: &[u64]) -> BulkUploadReport {
    BulkUploadReport {
        successfully_created: created.to_vec(),
        failed_to_create: failed.to_vec(),
    }
}

#[tokio::test]
async fn classifies_good_and_bad_rows_by_line() {
    let (uploader, players) = uploader(None);
    let csv = format!(
        "{HEADER}\n\
         Lionel,Messi,1987-06-24,1.70,Argentina,ST|CAM\n\
         Bad,Row,not-a-date,1.70,Spain,CB\n"
    );

    let result = uploader.upload(csv.as_bytes()).await.unwrap();

    assert_eq!(result, report(&[2], &[3]));
    let stored = players.get_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].full_name(), "Lionel Messi");
}

#[tokio::test]
async fn empty_upload_is_a_stream_error() {
    let (uploader, _) = uploader(None);
    let err = uploader.upload(b"").await.unwrap_err();
    assert!(matches!(err, RosterError::EmptyUpload));
    assert!(err.is_stream_level());
}

#[tokio::test]
async fn blank_first_line_is_read_as_the_header() {
    let (uploader, players) = uploader(None);

    let err = uploader.upload(b"\n\n").await.unwrap_err();
    assert!(matches!(err, RosterError::MissingColumn(ref col) if col == "firstName"));

    let csv = format!("\n{HEADER}\nLionel,Messi,1987-06-24,1.70,Argentina,ST\n");
    let err = uploader.upload(csv.as_bytes()).await.unwrap_err();
    assert!(err.is_stream_level());
    assert!(players.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_lines_are_failed_rows_and_keep_numbering() {
    let (uploader, _) = uploader(None);
    let csv = format!(
        "{HEADER}\n\
         Lionel,Messi,1987-06-24,1.70,Argentina,ST\n\
         \n\
         Bad,Row,not-a-date,1.70,Spain,CB\n\
         Sergio,Ramos,1986-03-30,1.84,Spain,CB\n"
    );

    let result = uploader.upload(csv.as_bytes()).await.unwrap();
    assert_eq!(result, report(&[2, 5], &[3, 4]));
}

#[tokio::test]
async fn missing_required_column_aborts_before_any_row() {
    let (uploader, players) = uploader(None);
    let csv = "firstName,lastName,dateOfBirth,nationalities,positions\n\
               Lionel,Messi,1987-06-24,Argentina,ST\n";

    let err = uploader.upload(csv.as_bytes()).await.unwrap_err();

    assert!(matches!(err, RosterError::MissingColumn(ref col) if col == "height"));
    assert!(players.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn reupload_fails_every_previous_success() {
    let (uploader, players) = uploader(None);
    let csv = format!(
        "{HEADER}\n\
         Lionel,Messi,1987-06-24,1.70,Argentina,ST|CAM\n\
         Sergio,Ramos,1986-03-30,1.84,Spain,CB\n\
         Bad,Row,not-a-date,1.70,Spain,CB\n"
    );

    let first = uploader.upload(csv.as_bytes()).await.unwrap();
    assert_eq!(first, report(&[2, 3], &[4]));

    let second = uploader.upload(csv.as_bytes()).await.unwrap();
    assert_eq!(second, report(&[], &[2, 3, 4]));
    assert_eq!(players.get_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn duplicates_within_one_upload_fail_the_later_row() {
    let (uploader, _) = uploader(None);
    let csv = format!(
        "{HEADER}\n\
         Lionel,Messi,1987-06-24,1.70,Argentina,ST\n\
         LIONEL,messi,1987-06-24,1.75,Spain,CB\n"
    );

    let result = uploader.upload(csv.as_bytes()).await.unwrap();
    assert_eq!(result, report(&[2], &[3]));
}

#[tokio::test]
async fn invalid_rows_do_not_stop_later_rows() {
    let (uploader, _) = uploader(None);
    let csv = format!(
        "{HEADER}\n\
         Too,Tall,1990-01-01,2.40,Spain,CB\n\
         No,Position,1990-01-01,1.80,Spain,\n\
         Unknown,Code,1990-01-01,1.80,Spain,GK\n\
         Future,Kid,2999-01-01,1.80,Spain,CB\n\
         Short,Line,1990-01-01\n\
         Multi,Nation,1992-02-02,1.80,Spain/France;Italy,CM#CDM\n"
    );

    let result = uploader.upload(csv.as_bytes()).await.unwrap();
    assert_eq!(result, report(&[7], &[2, 3, 4, 5, 6]));
}

#[tokio::test]
async fn columns_may_come_in_any_order() {
    let (uploader, players) = uploader(None);
    let csv = "positions,height,notes,nationalities,dateOfBirth,lastName,firstName\n\
               ST!LW,1.78,fast,France|Cameroon,1998-12-20,Mbappe,Kylian\n";

    let result = uploader.upload(csv.as_bytes()).await.unwrap();
    assert_eq!(result, report(&[2], &[]));

    let stored = players.get_all().await.unwrap();
    assert_eq!(stored[0].nationalities.len(), 2);
    assert_eq!(stored[0].positions.len(), 2);
}

#[tokio::test]
async fn header_only_upload_yields_empty_report() {
    let (uploader, _) = uploader(None);
    let result = uploader.upload(format!("{HEADER}\n").as_bytes()).await.unwrap();
    assert_eq!(result, BulkUploadReport::default());
}

#[tokio::test]
async fn rows_past_the_limit_are_failed_unprocessed() {
    let (uploader, players) = uploader(Some(1));
    let csv = format!(
        "{HEADER}\n\
         Lionel,Messi,1987-06-24,1.70,Argentina,ST\n\
         Sergio,Ramos,1986-03-30,1.84,Spain,CB\n"
    );

    let result = uploader.upload(csv.as_bytes()).await.unwrap();
    assert_eq!(result, report(&[2], &[3]));
    assert_eq!(players.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn crlf_line_endings_keep_line_numbers() {
    let (uploader, _) = uploader(None);
    let csv = format!(
        "{HEADER}\r\n\
         Bad,Row,nope,1.70,Spain,CB\r\n\
         Lionel,Messi,1987-06-24,1.70,Argentina,ST\r\n"
    );

    let result = uploader.upload(csv.as_bytes()).await.unwrap();
    assert_eq!(result, report(&[3], &[2]));
}

#[tokio::test]
async fn row_validator_returns_a_verdict() {
    let (uploader, _) = uploader(None);

    assert_eq!(uploader.validate_row(&common::messi()), RowVerdict::Valid);

    let mut bad = common::messi();
    bad.height = Some(1.2);
    match uploader.validate_row(&bad) {
        RowVerdict::Invalid(violations) => assert_eq!(violations[0].field, "height"),
        RowVerdict::Valid => panic!("height 1.2 accepted"),
    }
}
