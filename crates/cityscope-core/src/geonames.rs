// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Builds the city dataset from the GeoNames `cities5000` and `countryInfo` dumps.

use crate::dataset::{City, CountryGroup, Dataset};
use crate::{ExplorerError, Result};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufRead, Read};
use std::path::{Path, PathBuf};

pub const CITIES_URL: &str = "https://download.geonames.org/export/dump/cities5000.zip";
pub const CITIES_ZIP: &str = "cities5000.zip";
pub const CITIES_TXT: &str = "cities5000.txt";
pub const COUNTRY_INFO_URL: &str = "https://download.geonames.org/export/dump/countryInfo.txt";
pub const COUNTRY_INFO_TXT: &str = "countryInfo.txt";

/// Countries whose listed cities add up to at least this many people keep
/// `LARGE_COUNTRY_CITIES` entries, the rest keep `SMALL_COUNTRY_CITIES`.
pub const LARGE_COUNTRY_POPULATION: u64 = 1_000_000;
pub const LARGE_COUNTRY_CITIES: usize = 10;
pub const SMALL_COUNTRY_CITIES: usize = 3;

const MIN_FIELDS: usize = 15;

pub fn wiki_link(name: &str) -> String {
    format!("https://en.wikipedia.org/wiki/{}", name.replace(' ', "_"))
}

/// Parses `cities5000.txt` into cities keyed by ISO country code.
/// Short rows and rows with unparsable numbers are skipped.
pub fn parse_cities<R: Read>(reader: R) -> Result<BTreeMap<String, Vec<City>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut countries: BTreeMap<String, Vec<City>> = BTreeMap::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("GeoNames row unreadable — error={}", e);
                skipped += 1;
                continue;
            }
        };
        if record.len() < MIN_FIELDS {
            skipped += 1;
            continue;
        }

        let parsed = (
            record[4].trim().parse::<f64>(),
            record[5].trim().parse::<f64>(),
            record[14].trim().parse::<u64>(),
        );
        let (Ok(lat), Ok(lon), Ok(population)) = parsed else {
            debug!("Skipping GeoNames row with bad numbers — name={}", &record[1]);
            skipped += 1;
            continue;
        };

        let name = record[1].to_string();
        countries
            .entry(record[8].to_string())
            .or_default()
            .push(City {
                wiki: wiki_link(&name),
                name,
                lat,
                lon,
                population,
            });
    }

    debug!(
        "Parsed GeoNames cities — countries={} skipped={}",
        countries.len(),
        skipped
    );
    Ok(countries)
}

/// Parses `countryInfo.txt` into ISO code → English country name.
pub fn parse_country_names<R: BufRead>(reader: R) -> Result<HashMap<String, String>> {
    let mut names = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() > 4 {
            names.insert(parts[0].to_string(), parts[4].to_string());
        }
    }
    Ok(names)
}

/// Keeps the most populous entry per city name.
fn dedup_by_name(mut cities: Vec<City>) -> Vec<City> {
    cities.sort_by(|a, b| b.population.cmp(&a.population));
    let mut seen = std::collections::HashSet::new();
    cities.retain(|c| seen.insert(c.name.clone()));
    cities
}

/// Selects the top cities per country and orders groups by country name.
pub fn build_dataset(
    cities_by_country: BTreeMap<String, Vec<City>>,
    country_names: &HashMap<String, String>,
) -> Dataset {
    let mut groups: Vec<CountryGroup> = cities_by_country
        .into_iter()
        .filter_map(|(iso2, cities)| {
            let total: u64 = cities.iter().map(|c| c.population).sum();
            let keep = if total >= LARGE_COUNTRY_POPULATION {
                LARGE_COUNTRY_CITIES
            } else {
                SMALL_COUNTRY_CITIES
            };
            let mut top = dedup_by_name(cities);
            top.truncate(keep);
            if top.is_empty() {
                return None;
            }
            Some(CountryGroup {
                name: country_names.get(&iso2).cloned().unwrap_or_else(|| iso2.clone()),
                iso2,
                cities: top,
            })
        })
        .collect();

    groups.sort_by(|a, b| a.name.cmp(&b.name));
    Dataset::new(groups)
}

fn download(client: &reqwest::blocking::Client, url: &str, dest: &Path) -> Result<()> {
    info!("Downloading — url={} dest={}", url, dest.display());
    let mut response = client.get(url).send()?.error_for_status()?;
    let mut file = File::create(dest)?;
    let bytes = response.copy_to(&mut file)?;
    debug!("Download complete — dest={} bytes={}", dest.display(), bytes);
    Ok(())
}

fn extract_member(archive_path: &Path, member: &str, dest: &Path) -> Result<()> {
    info!(
        "Extracting — archive={} member={}",
        archive_path.display(),
        member
    );
    let mut archive = zip::ZipArchive::new(File::open(archive_path)?)?;
    let mut entry = archive.by_name(member)?;
    let mut out = File::create(dest)?;
    std::io::copy(&mut entry, &mut out)?;
    Ok(())
}

/// Downloads (when missing) and processes the GeoNames dumps in `work_dir`.
pub struct Generator {
    work_dir: PathBuf,
    client: reqwest::blocking::Client,
}

impl Generator {
    pub fn new(work_dir: PathBuf, client: reqwest::blocking::Client) -> Self {
        Self { work_dir, client }
    }

    fn ensure_inputs(&self) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(&self.work_dir)?;
        let zip_path = self.work_dir.join(CITIES_ZIP);
        let txt_path = self.work_dir.join(CITIES_TXT);
        let info_path = self.work_dir.join(COUNTRY_INFO_TXT);

        if !zip_path.exists() {
            download(&self.client, CITIES_URL, &zip_path)?;
        }
        if !txt_path.exists() {
            extract_member(&zip_path, CITIES_TXT, &txt_path)?;
        }
        if !info_path.exists() {
            download(&self.client, COUNTRY_INFO_URL, &info_path)?;
        }
        Ok((txt_path, info_path))
    }

    pub fn run(&self) -> Result<Dataset> {
        let (txt_path, info_path) = self.ensure_inputs()?;
        let cities = parse_cities(File::open(&txt_path)?)?;
        let names = parse_country_names(std::io::BufReader::new(File::open(&info_path)?))?;
        if names.is_empty() {
            return Err(ExplorerError::MalformedRecord(format!(
                "no country names in {}",
                info_path.display()
            )));
        }
        let dataset = build_dataset(cities, &names);
        info!(
            "Generated dataset — countries={} cities={}",
            dataset.groups.len(),
            dataset.city_count()
        );
        Ok(dataset)
    }
}
