// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{cell::RefCell, collections::HashSet, path::Path};

use super::*;
use crate::constants::{DEFAULT_IONEX_PREFIX, DEFAULT_IONEX_SERVER};

/// MJD of 2018-08-07.
const MJD_2018_219: f64 = 58337.0;

/// Serves the URLs it's been told about and remembers every request.
#[derive(Default)]
struct FakeFetcher {
    available: HashSet<String>,
    requested: RefCell<Vec<String>>,
}

impl FakeFetcher {
    fn serving(urls: &[&str]) -> FakeFetcher {
        FakeFetcher {
            available: urls.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl IonexFetcher for FakeFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), IonexError> {
        self.requested.borrow_mut().push(url.to_string());
        if self.available.contains(url) {
            std::fs::write(destination, "IONEX").unwrap();
            Ok(())
        } else {
            Err(IonexError::UnsupportedScheme(url.to_string()))
        }
    }
}

fn one_hour_on_day_219() -> TimeRange {
    TimeRange {
        first: MJD_2018_219 * 86400.0 + 3600.0,
        last: MJD_2018_219 * 86400.0 + 7200.0,
        interval: 10.0,
    }
}

const CODE_URL: &str = "http://ftp.aiub.unibe.ch/CODE/2018/CODG2190.18I.Z";
const UWM_URL: &str = "https://igsiono.uwm.edu.pl/data/ilt/2018/219/igrg2190.18i";

#[test]
fn test_filenames_and_urls() {
    let day = ObservationDay {
        year: 2018,
        day_of_year: 219,
    };
    let code = IonexSource::new(DEFAULT_IONEX_SERVER, DEFAULT_IONEX_PREFIX);
    assert_eq!(code.layout, IonexLayout::Code);
    assert_eq!(code.filename(&day), "CODG2190.18I.Z");
    assert_eq!(code.url(&day), CODE_URL);

    let uwm = IonexSource::new("https://igsiono.uwm.edu.pl/", "igrg");
    assert_eq!(uwm.layout, IonexLayout::Uwm);
    assert_eq!(uwm.filename(&day), "igrg2190.18i");
    assert_eq!(uwm.url(&day), UWM_URL);

    let early = ObservationDay {
        year: 2005,
        day_of_year: 7,
    };
    assert_eq!(code.filename(&early), "CODG0070.05I.Z");
}

#[test]
fn test_default_candidates() {
    let candidates = default_candidates(DEFAULT_IONEX_SERVER, DEFAULT_IONEX_PREFIX);
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].server, DEFAULT_IONEX_SERVER);
    assert_eq!(candidates[1].server, "https://igsiono.uwm.edu.pl");
    assert_eq!(candidates[1].prefix, "igrg");

    // The fallback isn't tried twice.
    let candidates = default_candidates("https://igsiono.uwm.edu.pl", "igrg");
    assert_eq!(candidates.len(), 1);
}

#[test]
fn test_try_candidates_in_order() {
    let mut tried = vec![];
    let result = try_candidates(&[1, 2, 3], |&c| {
        tried.push(c);
        if c == 2 {
            Ok(c * 10)
        } else {
            Err(format!("{c} failed"))
        }
    });
    assert_eq!(result, Ok((&2, 20)));
    assert_eq!(tried, vec![1, 2]);

    let result: Result<(&i32, ()), _> = try_candidates(&[1, 2, 3], |&c| Err(c));
    let failures = result.unwrap_err();
    assert_eq!(failures, vec![(&1, 1), (&2, 2), (&3, 3)]);

    let result: Result<(&i32, ()), Vec<(&i32, ())>> = try_candidates(&[], |_| Ok(()));
    assert!(result.unwrap_err().is_empty());
}

#[test]
fn test_days_covered() {
    let days = days_covered(&one_hour_on_day_219()).unwrap();
    assert_eq!(
        days,
        vec![ObservationDay {
            year: 2018,
            day_of_year: 219
        }]
    );

    // Ending just before midnight; the padding pushes into the next day.
    let range = TimeRange {
        first: MJD_2018_219 * 86400.0 + 3600.0,
        last: (MJD_2018_219 + 1.0) * 86400.0 - 5.0,
        interval: 10.0,
    };
    let days = days_covered(&range).unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[1].day_of_year, 220);

    // New year's eve.
    let range = TimeRange {
        first: 58483.0 * 86400.0 + 80000.0,
        last: 58484.0 * 86400.0 + 3600.0,
        interval: 1.0,
    };
    let days = days_covered(&range).unwrap();
    assert_eq!(
        days,
        vec![
            ObservationDay {
                year: 2018,
                day_of_year: 365
            },
            ObservationDay {
                year: 2019,
                day_of_year: 1
            }
        ]
    );

    let range = TimeRange {
        first: f64::NAN,
        last: 0.0,
        interval: 1.0,
    };
    assert!(matches!(
        days_covered(&range),
        Err(IonexError::BadTimeRange { .. })
    ));
}

#[test]
fn test_falls_over_to_next_server() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = FakeFetcher::serving(&[UWM_URL]);
    let candidates = default_candidates(DEFAULT_IONEX_SERVER, DEFAULT_IONEX_PREFIX);
    let paths = retrieve_ionex(&one_hour_on_day_219(), &candidates, dir.path(), &fetcher).unwrap();
    assert_eq!(paths, vec![dir.path().join("igrg2190.18i")]);
    assert!(paths[0].exists());
    assert_eq!(*fetcher.requested.borrow(), vec![CODE_URL, UWM_URL]);
}

#[test]
fn test_existing_files_are_reused() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("CODG2190.18I.Z"), "IONEX").unwrap();
    let fetcher = FakeFetcher::default();
    let candidates = default_candidates(DEFAULT_IONEX_SERVER, DEFAULT_IONEX_PREFIX);
    let paths = retrieve_ionex(&one_hour_on_day_219(), &candidates, dir.path(), &fetcher).unwrap();
    assert_eq!(paths, vec![dir.path().join("CODG2190.18I.Z")]);
    assert!(fetcher.requested.borrow().is_empty());
}

#[test]
fn test_exhausted_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = FakeFetcher::default();
    let candidates = default_candidates(DEFAULT_IONEX_SERVER, DEFAULT_IONEX_PREFIX);
    let result = retrieve_ionex(&one_hour_on_day_219(), &candidates, dir.path(), &fetcher);
    match result {
        Err(IonexError::Exhausted { day, attempts }) => {
            assert_eq!(day, "2018, day 219");
            assert_eq!(attempts.len(), 2);
            assert!(attempts[0].starts_with(DEFAULT_IONEX_SERVER));
            assert!(attempts[1].starts_with("https://igsiono.uwm.edu.pl"));
        }
        other => panic!("expected an exhausted error, got {other:?}"),
    }
}

#[test]
fn test_latest_day_first() {
    let dir = tempfile::tempdir().unwrap();
    let range = TimeRange {
        first: MJD_2018_219 * 86400.0 + 80000.0,
        last: (MJD_2018_219 + 1.0) * 86400.0 + 3600.0,
        interval: 10.0,
    };
    let day_220 = "http://ftp.aiub.unibe.ch/CODE/2018/CODG2200.18I.Z";
    let fetcher = FakeFetcher::serving(&[CODE_URL, day_220]);
    let candidates = default_candidates(DEFAULT_IONEX_SERVER, DEFAULT_IONEX_PREFIX);
    let paths = retrieve_ionex(&range, &candidates, dir.path(), &fetcher).unwrap();
    assert_eq!(*fetcher.requested.borrow(), vec![day_220, CODE_URL]);
    assert_eq!(
        paths,
        vec![
            dir.path().join("CODG2200.18I.Z"),
            dir.path().join("CODG2190.18I.Z")
        ]
    );
}

#[test]
fn test_ionex_dir_must_be_a_directory() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let result = retrieve_ionex(
        &one_hour_on_day_219(),
        &default_candidates(DEFAULT_IONEX_SERVER, DEFAULT_IONEX_PREFIX),
        file.path(),
        &FakeFetcher::default(),
    );
    assert!(matches!(result, Err(IonexError::NotADirectory(_))));
}

#[test]
fn test_http_fetcher_rejects_ftp() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(None).unwrap();
    let result = fetcher.fetch(
        "ftp://ftp.aiub.unibe.ch/CODE/2018/CODG2190.18I.Z",
        &dir.path().join("CODG2190.18I.Z"),
    );
    assert!(matches!(result, Err(IonexError::UnsupportedScheme(_))));
}

#[test]
fn test_proxy_urls() {
    let proxy = ProxyConfig {
        server: "proxy.example.com".to_string(),
        port: Some(3128),
        ..Default::default()
    };
    assert_eq!(proxy.url(), "http://proxy.example.com:3128");

    let proxy = ProxyConfig {
        server: "proxy.example.com".to_string(),
        proxy_type: Some("socks5".to_string()),
        ..Default::default()
    };
    assert_eq!(proxy.url(), "socks5://proxy.example.com");

    let proxy = ProxyConfig {
        server: "https://proxy.example.com".to_string(),
        port: Some(8443),
        ..Default::default()
    };
    assert_eq!(proxy.url(), "https://proxy.example.com:8443");
    assert!(HttpFetcher::new(Some(&proxy)).is_ok());
}
