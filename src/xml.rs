//! TCX tree rendering.
//!
//! Renders the assembled [`TcxDocument`] to an XML string following the
//! TrainingCenterDatabase v2 schema (namespace declarations, element
//! ordering). Writing the bytes to storage is the caller's responsibility.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{ReconError, Result};
use crate::tcx::{TcxDocument, TcxTrackpoint, TcxVersion};

/// TrainingCenterDatabase v2 namespace.
pub const TCX_NS: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";

const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2 \
     http://www.garmin.com/xmlschemas/TrainingCenterDatabasev2.xsd";

type W = Writer<Vec<u8>>;

fn xml_err<E: std::fmt::Display>(err: E) -> ReconError {
    ReconError::Xml {
        message: err.to_string(),
    }
}

fn open(w: &mut W, name: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)
}

fn close(w: &mut W, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)
}

fn leaf(w: &mut W, name: &str, value: &str) -> Result<()> {
    open(w, name)?;
    w.write_event(Event::Text(BytesText::new(value)))
        .map_err(xml_err)?;
    close(w, name)
}

/// Wrapped heart-rate element (`<Name><Value>n</Value></Name>`).
fn bpm_value(w: &mut W, name: &str, value: u32) -> Result<()> {
    open(w, name)?;
    leaf(w, "Value", &value.to_string())?;
    close(w, name)
}

fn version(w: &mut W, v: &TcxVersion) -> Result<()> {
    open(w, "Version")?;
    leaf(w, "VersionMajor", &v.major.to_string())?;
    leaf(w, "VersionMinor", &v.minor.to_string())?;
    leaf(w, "BuildMajor", &v.build_major.to_string())?;
    leaf(w, "BuildMinor", &v.build_minor.to_string())?;
    close(w, "Version")
}

fn write_trackpoint(w: &mut W, tp: &TcxTrackpoint) -> Result<()> {
    open(w, "Trackpoint")?;
    leaf(w, "Time", &tp.time)?;
    if let Some(pos) = &tp.position {
        open(w, "Position")?;
        leaf(w, "LatitudeDegrees", &pos.latitude_degrees.to_string())?;
        leaf(w, "LongitudeDegrees", &pos.longitude_degrees.to_string())?;
        close(w, "Position")?;
    }
    if let Some(alt) = tp.altitude_meters {
        leaf(w, "AltitudeMeters", &alt.to_string())?;
    }
    leaf(w, "DistanceMeters", &tp.distance_meters.to_string())?;
    if let Some(hr) = tp.heart_rate_bpm {
        bpm_value(w, "HeartRateBpm", hr)?;
    }
    leaf(w, "Cadence", &tp.cadence.to_string())?;
    leaf(w, "SensorState", &tp.sensor_state)?;
    close(w, "Trackpoint")
}

/// Render a document tree to an indented XML string.
///
/// # Errors
/// Returns [`ReconError::Xml`] when the underlying writer fails.
pub fn render_tcx(doc: &TcxDocument) -> Result<String> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    let mut root = BytesStart::new("TrainingCenterDatabase");
    root.push_attribute(("xmlns", TCX_NS));
    root.push_attribute(("xmlns:xsi", XSI_NS));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    w.write_event(Event::Start(root)).map_err(xml_err)?;

    open(&mut w, "Activities")?;
    let act = &doc.activity;
    let mut activity = BytesStart::new("Activity");
    activity.push_attribute(("Sport", act.sport.as_str()));
    w.write_event(Event::Start(activity)).map_err(xml_err)?;
    leaf(&mut w, "Id", &act.id)?;

    let lap = &act.lap;
    let mut lap_elt = BytesStart::new("Lap");
    lap_elt.push_attribute(("StartTime", lap.start_time.as_str()));
    w.write_event(Event::Start(lap_elt)).map_err(xml_err)?;
    leaf(&mut w, "TotalTimeSeconds", &lap.total_time_seconds.to_string())?;
    leaf(&mut w, "DistanceMeters", &lap.distance_meters.to_string())?;
    leaf(&mut w, "Calories", &lap.calories.to_string())?;
    if let Some(hr) = lap.average_heart_rate {
        bpm_value(&mut w, "AverageHeartRateBpm", hr)?;
    }
    if let Some(hr) = lap.maximum_heart_rate {
        bpm_value(&mut w, "MaximumHeartRateBpm", hr)?;
    }
    leaf(&mut w, "Intensity", &lap.intensity)?;
    if let Some(cadence) = lap.cadence {
        leaf(&mut w, "Cadence", &cadence.to_string())?;
    }
    leaf(&mut w, "TriggerMethod", &lap.trigger_method)?;

    open(&mut w, "Track")?;
    for tp in &lap.track {
        write_trackpoint(&mut w, tp)?;
    }
    close(&mut w, "Track")?;
    close(&mut w, "Lap")?;

    leaf(&mut w, "Notes", &act.notes)?;

    let mut creator = BytesStart::new("Creator");
    creator.push_attribute(("xsi:type", "Device_t"));
    w.write_event(Event::Start(creator)).map_err(xml_err)?;
    leaf(&mut w, "Name", &act.creator.name)?;
    leaf(&mut w, "UnitId", &act.creator.unit_id.to_string())?;
    leaf(&mut w, "ProductID", &act.creator.product_id.to_string())?;
    version(&mut w, &act.creator.version)?;
    close(&mut w, "Creator")?;

    close(&mut w, "Activity")?;
    close(&mut w, "Activities")?;

    let mut author = BytesStart::new("Author");
    author.push_attribute(("xsi:type", "Application_t"));
    w.write_event(Event::Start(author)).map_err(xml_err)?;
    leaf(&mut w, "Name", &doc.author.name)?;
    open(&mut w, "Build")?;
    version(&mut w, &doc.author.version)?;
    leaf(&mut w, "Time", &doc.author.build_time)?;
    close(&mut w, "Build")?;
    leaf(&mut w, "LangID", &doc.author.lang_id)?;
    leaf(&mut w, "PartNumber", &doc.author.part_number)?;
    close(&mut w, "Author")?;

    close(&mut w, "TrainingCenterDatabase")?;

    String::from_utf8(w.into_inner()).map_err(xml_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assemble, build_timeline, interpolate_fields, summarize, BuildInfo, WorkoutSummary};
    use quick_xml::Reader;
    use serde_json::json;

    fn sample_doc() -> TcxDocument {
        let summary: WorkoutSummary = serde_json::from_value(json!({
            "id": 1,
            "category": 2,
            "model": 55,
            "attrib": 0,
            "startdate": 1_700_000_000,
            "enddate": 1_700_000_010,
            "data": { "calories": 5.0, "hr_average": 110, "hr_max": 130 }
        }))
        .unwrap();
        let points = interpolate_fields(&build_timeline(summary.start, summary.end, &[]).unwrap());
        let stats = summarize(&points);
        assemble(&summary, &points, &stats, &BuildInfo::new("2024-01-01T00:00:00Z", "trackweave"))
    }

    #[test]
    fn test_render_well_formed() {
        let xml = render_tcx(&sample_doc()).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("TrainingCenterDatabase"));
        assert!(xml.contains("Sport=\"Running\""));

        // Must parse cleanly end to end
        let mut reader = Reader::from_str(&xml);
        let mut trackpoints = 0;
        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Start(e)) => {
                    if e.name().as_ref() == b"Trackpoint" {
                        trackpoints += 1;
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("rendered XML failed to parse: {e}"),
            }
        }
        assert_eq!(trackpoints, 11);
    }

    #[test]
    fn test_render_omits_absent_fields() {
        let mut doc = sample_doc();
        doc.activity.lap.average_heart_rate = None;
        for tp in &mut doc.activity.lap.track {
            tp.heart_rate_bpm = None;
        }
        let xml = render_tcx(&doc).unwrap();

        assert!(!xml.contains("AverageHeartRateBpm"));
        assert!(!xml.contains("<HeartRateBpm>"));
        assert!(!xml.contains("Position"));
        assert!(xml.contains("MaximumHeartRateBpm"));
    }

    #[test]
    fn test_render_escapes_text() {
        let mut doc = sample_doc();
        doc.author.name = "a<b&c".to_string();
        let xml = render_tcx(&doc).unwrap();

        assert!(xml.contains("a&lt;b&amp;c"));
    }
}
