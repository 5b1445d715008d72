//! # Parallel Alignment
//!
//! Joins two encoded editions through a hand-maintained reference mapping.
//!
//! The mapping is a CSV table with one row per primary verse and the secondary
//! reference it corresponds to. The secondary side may be empty, a single verse or
//! a same-chapter range (`24:40-24:45`). [`skeleton`] writes the identity mapping as
//! a starting point for editing; [`build_rows`] resolves it into [`ParallelRow`]s
//! ready for typesetting.

use std::io;

use serde::{Deserialize, Serialize};

use crate::{
    reference::{RefError, SecondaryRef, VerseRef},
    verse_map::VerseMap,
};

/// Shown in the secondary reference column when a primary verse has no counterpart.
pub const NO_COUNTERPART: &str = "—";

#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Mapping has no {0:?} column")]
    MissingColumn(String),
    #[error("Bad reference on mapping line {line}: {source}")]
    Reference {
        line: u64,
        #[source]
        source: RefError,
    },
    #[error("Cannot resolve the counterpart of {primary}: {source}")]
    Counterpart {
        primary: VerseRef,
        #[source]
        source: RefError,
    },
}

/// Header names of the two reference columns in a mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingColumns {
    pub primary: String,
    pub secondary: String,
}

impl Default for MappingColumns {
    fn default() -> Self {
        Self {
            primary: "lxx_ref".to_string(),
            secondary: "mt_ref".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub primary: VerseRef,
    pub secondary: Option<SecondaryRef>,
}

/// One typeset row: a primary verse beside its secondary counterpart.
///
/// Texts are still in the encoded wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelRow {
    #[serde(rename = "lxx_ref")]
    pub primary_ref: VerseRef,
    #[serde(rename = "lxx_text")]
    pub primary_text: String,
    #[serde(rename = "mt_ref")]
    pub secondary_ref: String,
    #[serde(rename = "mt_text")]
    pub secondary_text: String,
}

/// The identity mapping over every verse of `verses`, in reference order.
pub fn skeleton(verses: &VerseMap) -> Vec<MappingRow> {
    let mut refs: Vec<VerseRef> = verses.refs().copied().collect();
    refs.sort();
    refs.into_iter()
        .map(|r| MappingRow {
            primary: r,
            secondary: Some(SecondaryRef::Single(r)),
        })
        .collect()
}

/// Reads a mapping table.
///
/// Column order is free; columns are found by header name. Rows with an empty
/// primary cell are skipped. Every reference is parsed here, so a malformed table
/// fails before any text is joined.
pub fn read_mapping<R: io::Read>(
    reader: R,
    columns: &MappingColumns,
) -> Result<Vec<MappingRow>, AlignError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| AlignError::MissingColumn(name.to_string()))
    };
    let primary_col = find(&columns.primary)?;
    let secondary_col = find(&columns.secondary)?;

    let mut rows = vec![];
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let bad = |source| AlignError::Reference { line, source };

        let primary = record.get(primary_col).unwrap_or("").trim();
        if primary.is_empty() {
            log::debug!("skipping mapping line {line} without a primary reference");
            continue;
        }
        let secondary = record.get(secondary_col).unwrap_or("").trim();

        rows.push(MappingRow {
            primary: primary.parse().map_err(bad)?,
            secondary: if secondary.is_empty() {
                None
            } else {
                Some(secondary.parse().map_err(bad)?)
            },
        });
    }
    Ok(rows)
}

pub fn write_mapping<W: io::Write>(
    writer: W,
    columns: &MappingColumns,
    rows: &[MappingRow],
) -> Result<(), AlignError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([&columns.primary, &columns.secondary])?;
    for row in rows {
        let secondary = row
            .secondary
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        wtr.write_record([row.primary.to_string(), secondary])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Resolves a mapping against two encoded editions.
///
/// A range on the secondary side joins the texts of its verses with single spaces,
/// skipping verses that are absent. Missing texts become empty strings and are
/// logged. Rows come back in primary reference order.
pub fn build_rows(
    mapping: &[MappingRow],
    primary: &VerseMap,
    secondary: &VerseMap,
) -> Result<Vec<ParallelRow>, AlignError> {
    let mut rows = Vec::with_capacity(mapping.len());

    for row in mapping {
        let primary_text = primary.get(&row.primary).unwrap_or_else(|| {
            log::warn!("no primary text for {}", row.primary);
            ""
        });

        let (secondary_ref, secondary_text) = match &row.secondary {
            None => (NO_COUNTERPART.to_string(), String::new()),
            Some(sref) => {
                let refs = sref.expand().map_err(|source| AlignError::Counterpart {
                    primary: row.primary,
                    source,
                })?;
                let texts: Vec<&str> = refs
                    .iter()
                    .filter_map(|r| secondary.get(r))
                    .filter(|t| !t.is_empty())
                    .collect();
                if texts.is_empty() {
                    log::warn!("no secondary text for {sref} (primary {})", row.primary);
                }
                (sref.to_string(), texts.join(" "))
            }
        };

        rows.push(ParallelRow {
            primary_ref: row.primary,
            primary_text: primary_text.to_string(),
            secondary_ref,
            secondary_text,
        });
    }

    rows.sort_by(|a, b| a.primary_ref.cmp(&b.primary_ref));
    Ok(rows)
}

pub fn write_rows<W: io::Write>(writer: W, rows: &[ParallelRow]) -> Result<(), AlignError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<ParallelRow>, AlignError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let rows = rdr.deserialize().collect::<Result<Vec<ParallelRow>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vref(s: &str) -> VerseRef {
        s.parse().unwrap()
    }

    fn edition(entries: &[(&str, &str)]) -> VerseMap {
        entries
            .iter()
            .map(|(r, t)| (vref(r), t.to_string()))
            .collect()
    }

    #[test]
    fn skeleton_is_sorted_identity() {
        let verses = edition(&[("1:2", "b"), ("1:1", "a"), ("24:40a", "c"), ("24:40", "d")]);
        let rows = skeleton(&verses);
        let shown: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.primary.to_string(), r.secondary.as_ref().unwrap().to_string()))
            .collect();
        assert_eq!(
            shown,
            [
                ("1:1".to_string(), "1:1".to_string()),
                ("1:2".into(), "1:2".into()),
                ("24:40".into(), "24:40".into()),
                ("24:40a".into(), "24:40a".into()),
            ]
        );
    }

    #[test]
    fn mapping_round_trips_through_csv() {
        let rows = vec![
            MappingRow {
                primary: vref("31:35"),
                secondary: Some("38:35-38:37".parse().unwrap()),
            },
            MappingRow {
                primary: vref("31:36"),
                secondary: None,
            },
        ];
        let columns = MappingColumns::default();
        let mut buf = vec![];
        write_mapping(&mut buf, &columns, &rows).unwrap();
        assert_eq!(
            String::from_utf8(buf.clone()).unwrap(),
            "lxx_ref,mt_ref\n31:35,38:35-38:37\n31:36,\n"
        );
        assert_eq!(read_mapping(buf.as_slice(), &columns).unwrap(), rows);
    }

    #[test]
    fn mapping_columns_are_found_by_name() {
        let csv = "note,target,source\nx,2:1,1:1\n,,\n";
        let columns = MappingColumns {
            primary: "source".into(),
            secondary: "target".into(),
        };
        let rows = read_mapping(csv.as_bytes(), &columns).unwrap();
        assert_eq!(
            rows,
            [MappingRow {
                primary: vref("1:1"),
                secondary: Some(SecondaryRef::Single(vref("2:1"))),
            }]
        );
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read_mapping("lxx_ref\n1:1\n".as_bytes(), &MappingColumns::default())
            .unwrap_err();
        assert!(matches!(err, AlignError::MissingColumn(c) if c == "mt_ref"));
    }

    #[test]
    fn malformed_reference_names_the_line() {
        let err = read_mapping(
            "lxx_ref,mt_ref\n1:1,1:1\n1-1,1:2\n".as_bytes(),
            &MappingColumns::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AlignError::Reference { line: 3, .. }));
    }

    #[test]
    fn builds_rows_with_ranges_gaps_and_order() {
        let primary = edition(&[("1:1", "␞P␞one"), ("1:2", "␞P␞two"), ("1:3", "␞P␞three")]);
        let secondary = edition(&[("2:1", "␞P␞a"), ("2:3", "␞P␞c")]);
        let mapping = vec![
            MappingRow {
                primary: vref("1:3"),
                secondary: None,
            },
            MappingRow {
                primary: vref("1:1"),
                secondary: Some("2:1-2:3".parse().unwrap()),
            },
            MappingRow {
                primary: vref("1:2"),
                secondary: Some("9:9".parse().unwrap()),
            },
            MappingRow {
                primary: vref("1:4"),
                secondary: Some("2:1".parse().unwrap()),
            },
        ];

        let rows = build_rows(&mapping, &primary, &secondary).unwrap();
        let shown: Vec<[&str; 3]> = rows
            .iter()
            .map(|r| {
                [
                    r.primary_text.as_str(),
                    r.secondary_ref.as_str(),
                    r.secondary_text.as_str(),
                ]
            })
            .collect();
        assert_eq!(
            shown,
            [
                ["␞P␞one", "2:1-2:3", "␞P␞a ␞P␞c"],
                ["␞P␞two", "9:9", ""],
                ["␞P␞three", "—", ""],
                ["", "2:1", "␞P␞a"],
            ]
        );
    }

    #[test]
    fn cross_chapter_counterpart_fails() {
        let mapping = vec![MappingRow {
            primary: vref("1:1"),
            secondary: Some("2:1-3:1".parse().unwrap()),
        }];
        let err = build_rows(&mapping, &VerseMap::new(), &VerseMap::new()).unwrap_err();
        assert!(matches!(
            err,
            AlignError::Counterpart {
                source: RefError::CrossChapter(_),
                ..
            }
        ));
    }

    #[test]
    fn rows_csv_uses_edition_headers() {
        let rows = vec![ParallelRow {
            primary_ref: vref("1:1"),
            primary_text: "␞P␞In, the beginning".into(),
            secondary_ref: "—".into(),
            secondary_text: String::new(),
        }];
        let mut buf = vec![];
        write_rows(&mut buf, &rows).unwrap();
        assert_eq!(
            String::from_utf8(buf.clone()).unwrap(),
            "lxx_ref,lxx_text,mt_ref,mt_text\n1:1,\"␞P␞In, the beginning\",—,\n"
        );
        assert_eq!(read_rows(buf.as_slice()).unwrap(), rows);
    }
}
