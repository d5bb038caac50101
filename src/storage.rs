use crate::datekey::DateKey;
use crate::store::Mark;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{btree_map::Entry, BTreeMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Everything that survives a restart
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct StoredDays {
    /// Start of the first day the tracker was used, in the offset that was
    /// local at the time
    pub(crate) install_date: Option<OffsetDateTime>,
    pub(crate) marks: BTreeMap<DateKey, Mark>,
    /// Entries of the data file that aren't valid dates, kept so that saving
    /// writes them back untouched
    pub(crate) unreadable: Vec<(Mark, String)>,
}

/// Durable home for [`StoredDays`].  `save` must not return until the data
/// is as durable as the backend can make it.
pub(crate) trait Storage {
    /// Returns an empty `StoredDays` if nothing has been saved yet
    fn load(&self) -> Result<StoredDays, StorageError>;

    fn save(&mut self, days: &StoredDays) -> Result<(), StorageError>;
}

impl<T: Storage + ?Sized> Storage for Box<T> {
    fn load(&self) -> Result<StoredDays, StorageError> {
        (**self).load()
    }

    fn save(&mut self, days: &StoredDays) -> Result<(), StorageError> {
        (**self).save(days)
    }
}

/// On-disk layout of the data file
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(default)]
    green_dates: Vec<String>,
    #[serde(default)]
    red_dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    install_date: Option<String>,
}

impl Document {
    fn encode(days: &StoredDays) -> Result<Document, StorageError> {
        let mut doc = Document::default();
        for (date, mark) in &days.marks {
            match mark {
                Mark::Green => doc.green_dates.push(date.to_string()),
                Mark::Red => doc.red_dates.push(date.to_string()),
            }
        }
        for (mark, s) in &days.unreadable {
            match mark {
                Mark::Green => doc.green_dates.push(s.clone()),
                Mark::Red => doc.red_dates.push(s.clone()),
            }
        }
        doc.install_date = days
            .install_date
            .map(|ts| ts.format(&Rfc3339))
            .transpose()
            .map_err(StorageError::EncodeInstallDate)?;
        Ok(doc)
    }

    // Unreadable day entries are set aside rather than failing the whole
    // load; only the install date is load-bearing enough to be fatal.  A day
    // listed as both green and red stays green, and the red entry is not
    // written back.
    fn decode(self, path: &Path) -> Result<StoredDays, StorageError> {
        let mut marks = BTreeMap::new();
        let mut unreadable = Vec::new();
        for (mark, dates) in [(Mark::Green, self.green_dates), (Mark::Red, self.red_dates)] {
            for s in dates {
                match s.parse::<DateKey>() {
                    Ok(date) => match marks.entry(date) {
                        Entry::Occupied(e) => {
                            let prev = e.get();
                            warn!("{date} is listed as both {prev} and {mark}; keeping {prev}");
                        }
                        Entry::Vacant(e) => {
                            e.insert(mark);
                        }
                    },
                    Err(e) => {
                        warn!("Keeping unreadable entry in {} as is: {e}", path.display());
                        unreadable.push((mark, s));
                    }
                }
            }
        }
        let install_date = self
            .install_date
            .map(|s| {
                OffsetDateTime::parse(&s, &Rfc3339).map_err(|source| {
                    StorageError::InvalidInstallDate {
                        path: path.to_owned(),
                        value: s,
                        source,
                    }
                })
            })
            .transpose()?;
        Ok(StoredDays {
            install_date,
            marks,
            unreadable,
        })
    }
}

/// Stores the days as a JSON document at a fixed path
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub(crate) fn new<P: Into<PathBuf>>(path: P) -> JsonFileStorage {
        JsonFileStorage { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<StoredDays, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StoredDays::default()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let doc = serde_json::from_str::<Document>(&content).map_err(|source| {
            StorageError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        doc.decode(&self.path)
    }

    // Write and sync a sibling file, then rename it into place, so that a
    // crash mid-write leaves the previous document intact
    fn save(&mut self, days: &StoredDays) -> Result<(), StorageError> {
        let mut content =
            serde_json::to_string_pretty(&Document::encode(days)?).map_err(StorageError::Serialize)?;
        content.push('\n');
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

/// Keeps the days in memory only; used when the data file cannot be opened
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct MemoryStorage {
    saved: Option<StoredDays>,
}

impl MemoryStorage {
    pub(crate) fn new() -> MemoryStorage {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<StoredDays, StorageError> {
        Ok(self.saved.clone().unwrap_or_default())
    }

    fn save(&mut self, days: &StoredDays) -> Result<(), StorageError> {
        self.saved = Some(days.clone());
        Ok(())
    }
}

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid install date {value:?} in {}", path.display())]
    InvalidInstallDate {
        path: PathBuf,
        value: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode install date")]
    EncodeInstallDate(#[source] time::error::Format),
    #[error("failed to serialize day marks")]
    Serialize(#[source] serde_json::Error),
}
