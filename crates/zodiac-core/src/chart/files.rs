use super::ephemeris::EphemerisError;
use std::path::{Path, PathBuf};

/// Swiss Ephemeris data files covering 1800–2399 (planets, Moon, main asteroids).
pub const EPHEMERIS_FILES: [&str; 3] = ["sepl_18.se1", "semo_18.se1", "seas_18.se1"];

/// Makes sure every file in [`EPHEMERIS_FILES`] exists under `dir`, downloading
/// the missing ones from `base_url`. Returns the files that were fetched.
pub async fn ensure_ephemeris_files(
    dir: &Path,
    base_url: &str,
    client: &reqwest::Client,
) -> Result<Vec<PathBuf>, EphemerisError> {
    tokio::fs::create_dir_all(dir).await?;

    let base = base_url.trim_end_matches('/');
    let mut fetched = Vec::new();
    for file in EPHEMERIS_FILES {
        let target = dir.join(file);
        if tokio::fs::try_exists(&target).await? {
            continue;
        }

        let url = format!("{base}/{file}");
        tracing::info!(target: "zodiac::chart", %url, "downloading ephemeris file");
        let download_err = |message: String| EphemerisError::Download {
            file: file.to_string(),
            message,
        };
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| download_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(download_err(format!("HTTP {}", response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_err(e.to_string()))?;

        // only complete files carry the final name
        let partial = dir.join(format!("{file}.part"));
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, &target).await?;
        fetched.push(target);
    }
    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn present_files_are_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        for file in EPHEMERIS_FILES {
            std::fs::write(dir.path().join(file), b"stub").unwrap();
        }
        // unroutable base url: any request would fail
        let fetched = ensure_ephemeris_files(dir.path(), "http://127.0.0.1:9/", &reqwest::Client::new())
            .await
            .unwrap();
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn missing_file_with_unreachable_source_is_a_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_ephemeris_files(dir.path(), "http://127.0.0.1:9", &reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EphemerisError::Download { ref file, .. } if file == "sepl_18.se1"));
    }
}
