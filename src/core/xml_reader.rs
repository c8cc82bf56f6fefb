use crate::domain::model::{Record, REQUIRED_FIELDS};
use crate::utils::error::{EtlError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, BTreeSet};

/// Element holding one measurement row.
pub const ROW_ELEMENT: &[u8] = b"TestStep";

type Fields = BTreeMap<String, String>;

/// Reads every `TestStep` element of a document into a field map. A row's fields are the
/// element's attributes and the text of its direct children.
pub fn read_test_steps(file: &str, data: &[u8]) -> Result<Vec<Fields>> {
    let malformed = |source: quick_xml::Error| EtlError::MalformedXml {
        file: file.to_string(),
        source,
    };

    let mut reader = Reader::from_reader(data);
    reader.trim_text(true);

    let mut rows = Vec::new();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    // (depth of the open TestStep, its fields, the open child and its text)
    let mut current: Option<(usize, Fields, Option<(String, String)>)> = None;

    loop {
        match reader.read_event_into(&mut buf).map_err(malformed)? {
            Event::Start(e) => {
                depth += 1;
                match current.as_mut() {
                    None if e.name().as_ref() == ROW_ELEMENT => {
                        current = Some((depth, attributes(&e).map_err(malformed)?, None));
                    }
                    Some((step_depth, _, child)) if depth == *step_depth + 1 => {
                        *child = Some((field_name(&e), String::new()));
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => match current.as_mut() {
                None if e.name().as_ref() == ROW_ELEMENT => {
                    rows.push(attributes(&e).map_err(malformed)?);
                }
                Some((step_depth, fields, _)) if depth == *step_depth => {
                    fields.entry(field_name(&e)).or_default();
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some((step_depth, _, Some((_, text)))) = current.as_mut() {
                    if depth == *step_depth + 1 {
                        text.push_str(&t.unescape().map_err(malformed)?);
                    }
                }
            }
            Event::CData(c) => {
                if let Some((step_depth, _, Some((_, text)))) = current.as_mut() {
                    if depth == *step_depth + 1 {
                        text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
            }
            Event::End(_) => {
                if let Some((step_depth, fields, child)) = current.as_mut() {
                    if depth == *step_depth + 1 {
                        if let Some((name, text)) = child.take() {
                            fields.insert(name, text);
                        }
                    } else if depth == *step_depth {
                        if let Some((_, fields, _)) = current.take() {
                            rows.push(fields);
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(malformed(quick_xml::Error::UnexpectedEof(
            "document ended inside an open element".to_string(),
        )));
    }

    Ok(rows)
}

/// Parses one input file into records, rejecting it as a whole when any required
/// column is absent from every row.
pub fn read_records(file: &str, data: &[u8]) -> Result<Vec<Record>> {
    let rows = read_test_steps(file, data)?;
    if rows.is_empty() {
        return Err(EtlError::NoTestSteps {
            file: file.to_string(),
        });
    }

    let present: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !present.contains(**field))
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(EtlError::MissingColumns {
            file: file.to_string(),
            missing,
            present: present.into_iter().map(str::to_string).collect(),
        });
    }

    Ok(rows.iter().map(Record::from_fields).collect())
}

fn field_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).trim().to_string()
}

fn attributes(e: &BytesStart<'_>) -> std::result::Result<Fields, quick_xml::Error> {
    let mut fields = Fields::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).trim().to_string();
        fields.insert(key, attr.unescape_value()?.into_owned());
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MeasuredValue;

    const ATTRIBUTE_ROWS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Report>
  <TestSteps>
    <TestStep Serial_No="354240388124327" Band="n77" UL_DL_Chans="650000/650000" Test="Max Power (dBm)" MeasValue="23.4" />
    <TestStep Serial_No="354240388124327" Band="B12" UL_DL_Chans="23095/5095" Test="Throughput (%)" MeasValue="94.2" />
  </TestSteps>
</Report>"#;

    #[test]
    fn test_reads_attribute_rows() {
        let records = read_records("a.xml", ATTRIBUTE_ROWS.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].serial_no, "354240388124327");
        assert_eq!(records[0].band, "n77");
        assert_eq!(records[0].measured_value, MeasuredValue::Number(23.4));
        assert_eq!(records[1].test_name, "Throughput (%)");
    }

    #[test]
    fn test_reads_child_element_rows() {
        let xml = r#"<Report><TestSteps>
            <TestStep Serial_No="S1">
                <Band> n77 </Band>
                <UL_DL_Chans>650000/650000</UL_DL_Chans>
                <Test>Throughput &amp; More</Test>
                <MeasValue><![CDATA[96.0]]></MeasValue>
                <Detail><Nested>ignored</Nested></Detail>
            </TestStep>
        </TestSteps></Report>"#;

        let records = read_records("b.xml", xml.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].serial_no, "S1");
        assert_eq!(records[0].band, "n77");
        assert_eq!(records[0].test_name, "Throughput & More");
        assert_eq!(records[0].measured_value, MeasuredValue::Number(96.0));
    }

    #[test]
    fn test_missing_column_rejects_whole_file() {
        let xml = r#"<Report>
            <TestStep Serial_No="S1" Band="n77" UL_DL_Chans="1/1" Test="Max Power (dBm)" />
            <TestStep Serial_No="S2" Band="n77" UL_DL_Chans="1/1" Test="Max Power (dBm)" />
        </Report>"#;

        match read_records("c.xml", xml.as_bytes()) {
            Err(EtlError::MissingColumns { file, missing, present }) => {
                assert_eq!(file, "c.xml");
                assert_eq!(missing, vec!["MeasValue".to_string()]);
                assert!(present.contains(&"Band".to_string()));
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_column_present_on_some_rows_only() {
        let xml = r#"<Report>
            <TestStep Serial_No="S1" Band="n77" UL_DL_Chans="1/1" Test="T" MeasValue="1" />
            <TestStep Serial_No="S2" Band="n77" UL_DL_Chans="1/1" Test="T" />
        </Report>"#;

        let records = read_records("d.xml", xml.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].measured_value, MeasuredValue::Empty);
    }

    #[test]
    fn test_no_test_steps() {
        let xml = "<Report><Summary /></Report>";
        assert!(matches!(
            read_records("e.xml", xml.as_bytes()),
            Err(EtlError::NoTestSteps { .. })
        ));
    }

    #[test]
    fn test_malformed_documents() {
        let mismatched = "<Report><TestStep Serial_No=\"S1\"></Report>";
        assert!(matches!(
            read_records("f.xml", mismatched.as_bytes()),
            Err(EtlError::MalformedXml { .. })
        ));

        let truncated = "<Report><TestStep Serial_No=\"S1\" Band=\"n77\">";
        assert!(matches!(
            read_records("g.xml", truncated.as_bytes()),
            Err(EtlError::MalformedXml { .. })
        ));
    }
}
