use std::fmt::Write as _;
use std::fs;

use assert_matches::assert_matches;
use camino::Utf8Path;
use tempfile::tempdir;

use tycg_stats::catalog::{Catalog, SEARCH_LIMIT, SearchOutcome};
use tycg_stats::error::StatsError;

const HEADER: &str = "所屬資料庫,tid,所屬類別,cid,資料名稱,sid,統計資料檔案格式\n";

fn catalog_with_population_rows() -> String {
    let mut content = HEADER.to_string();
    for i in 1..=28 {
        let label = match i {
            4 => "Population by district".to_string(),
            11 => "Resident POPULATION".to_string(),
            25 => "population density".to_string(),
            _ => format!("Series {i}"),
        };
        let _ = writeln!(content, "db,1,Misc,1,{label},{i},");
    }
    content
}

#[test]
fn search_keeps_catalog_order() {
    let catalog = Catalog::from_csv_str(&catalog_with_population_rows()).unwrap();
    assert_eq!(catalog.len(), 28);

    let SearchOutcome::Matches(found) = catalog.search("population") else {
        panic!("expected matches");
    };
    let ids = found.iter().map(|e| e.series_id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["000004", "000011", "000025"]);
}

#[test]
fn search_is_capped() {
    let mut content = HEADER.to_string();
    for i in 1..=30 {
        let _ = writeln!(content, "db,1,人口,1,人口數 {i},{i},");
    }
    let catalog = Catalog::from_csv_str(&content).unwrap();
    assert_matches!(
        catalog.search("人口"),
        SearchOutcome::Matches(ref found) if found.len() == SEARCH_LIMIT
    );
    assert_eq!(catalog.search("不存在"), SearchOutcome::NoResults);
}

#[test]
fn load_from_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("statistics.csv");
    fs::write(&path, catalog_with_population_rows()).unwrap();
    let path = Utf8Path::from_path(&path).unwrap();

    let catalog = Catalog::discover(Some(path)).unwrap();
    assert_eq!(catalog.len(), 28);
    assert_eq!(catalog.entries()[0].key().to_string(), "0001-0001-000001");
}

#[test]
fn missing_path_is_a_read_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let path = Utf8Path::from_path(&path).unwrap();
    assert_matches!(Catalog::load(path), Err(StatsError::CatalogRead(_)));
}
