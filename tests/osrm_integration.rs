//! Detailed path requests against a real OSRM server.
//!
//! Needs a prepared (MLD) OSRM dataset covering Tacna. Set
//! `TACNA_OSRM_DATA_DIR` to its directory and, if the file is not
//! `peru-latest.osrm`, `TACNA_OSRM_FILE` to its name. Skipped otherwise.

mod fixtures;

use std::env;
use std::path::PathBuf;

use testcontainers::core::{IntoContainerPort, Mount};
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, ReuseDirective, TestcontainersError};

use tacna_navigator::directions::request_detailed_path;
use tacna_navigator::model::ConceptualPath;
use tacna_navigator::osrm::{OsrmClient, OsrmConfig};

use fixtures::{CIUDAD_UNIVERSITARIA, MERCADO_CENTRAL, PLAZA_DE_ARMAS};

fn osrm_container(data_dir: PathBuf, file: String) -> Result<(Container<GenericImage>, String), TestcontainersError> {
    let image = GenericImage::new("osrm/osrm-backend", "latest")
        .with_exposed_port(5000.tcp())
        .with_mount(Mount::bind_mount(data_dir.to_string_lossy().to_string(), "/data"))
        .with_cmd(vec![
            "osrm-routed".to_string(),
            "--algorithm".to_string(),
            "mld".to_string(),
            format!("/data/{}", file),
        ])
        .with_container_name("osrm-tacna-mld")
        .with_startup_timeout(std::time::Duration::from_secs(60))
        .with_reuse(ReuseDirective::Always);

    let container = image.start()?;
    let port = container.get_host_port_ipv4(5000.tcp())?;
    Ok((container, format!("http://127.0.0.1:{}", port)))
}

#[test]
fn osrm_traces_conceptual_waypoints() {
    let Some(data_dir) = env::var_os("TACNA_OSRM_DATA_DIR").map(PathBuf::from) else {
        eprintln!("TACNA_OSRM_DATA_DIR not set, skipping OSRM integration test");
        return;
    };
    let file = env::var("TACNA_OSRM_FILE").unwrap_or_else(|_| "peru-latest.osrm".to_string());
    let (container, base_url) = osrm_container(data_dir, file).expect("start OSRM container");

    let client = OsrmClient::new(OsrmConfig {
        base_url,
        ..OsrmConfig::default()
    })
    .expect("build OSRM client");

    let path = ConceptualPath {
        description: String::new(),
        coordinates: vec![
            PLAZA_DE_ARMAS.coord(),
            MERCADO_CENTRAL.coord(),
            CIUDAD_UNIVERSITARIA.coord(),
        ],
        reasoning: String::new(),
    };

    // The server may still be loading the dataset right after start.
    let detailed = {
        let start = std::time::Instant::now();
        loop {
            match request_detailed_path(&client, &path) {
                Ok(detailed) => break detailed,
                Err(err) if start.elapsed() < std::time::Duration::from_secs(20) => {
                    eprintln!("OSRM not ready yet: {}", err);
                    std::thread::sleep(std::time::Duration::from_millis(500));
                }
                Err(err) => {
                    if let Ok(stderr) = container.stderr_to_vec() {
                        eprintln!("OSRM stderr:\n{}", String::from_utf8_lossy(&stderr));
                    }
                    panic!("OSRM never produced a route: {}", err);
                }
            }
        }
    };

    assert!(detailed.len() >= 2);
    let first = detailed.points()[0];
    assert!((first.lat - PLAZA_DE_ARMAS.lat).abs() < 0.01);
    assert!((first.lng - PLAZA_DE_ARMAS.lng).abs() < 0.01);

    drop(container);
}
