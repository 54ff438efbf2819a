//! 🥡 Parsing of the upstream XML payloads.
//!
//! Every response embeds a `result_Code` (success sentinel `"200"`), an
//! optional `result_Msg` for when the news is bad, and zero or one `<item>`
//! whose immediate children are the record's field/value pairs. Which
//! children actually show up varies by dataset and, frankly, by mood — so
//! the flattening is dynamic rather than mapped onto a fixed struct. The
//! struct would have wanted commitment. The API does not do commitment.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::Record;
use crate::error::FetchError;
use crate::upstream::Fetched;

const SUCCESS_CODE: &str = "200";

/// 🔍 Validates the embedded status and flattens the first `<item>`.
///
/// ⚠️ A missing `result_Code` is treated as a rejection — an endpoint that
/// won't even say "200" is not an endpoint we accept produce from.
pub(crate) fn parse(xml: &str) -> Result<Fetched, FetchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut result_code: Option<String> = None;
    let mut result_msg: Option<String> = None;
    let mut record: Option<Record> = None;

    // -- 🧭 element-name stack; `item_depth` is the stack depth of the open
    // <item>, so its direct children sit at exactly item_depth + 1.
    // grandchildren live deeper and do not get to be fields.
    let mut path: Vec<String> = Vec::new();
    let mut item_depth: Option<usize> = None;
    let mut field: Option<(String, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                path.push(name.clone());
                if item_depth.is_none() && record.is_none() && name == "item" {
                    item_depth = Some(path.len());
                    record = Some(Record::default());
                } else if let Some(depth) = item_depth {
                    if path.len() == depth + 1 {
                        field = Some((name, String::new()));
                    }
                }
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if item_depth.is_none() && record.is_none() && name == "item" {
                    // -- 🫙 self-closing <item/>: an empty result, not an error
                    record = Some(Record::default());
                } else if item_depth.is_some_and(|depth| path.len() == depth) {
                    if let Some(record) = record.as_mut() {
                        record.insert(name, String::new());
                    }
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(quick_xml::Error::from)?.into_owned();
                append_text(&path, item_depth, &mut field, &mut result_code, &mut result_msg, text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                append_text(&path, item_depth, &mut field, &mut result_code, &mut result_msg, text);
            }
            Event::End(_) => {
                if let Some(depth) = item_depth {
                    if path.len() == depth + 1 {
                        if let (Some((name, value)), Some(record)) =
                            (field.take(), record.as_mut())
                        {
                            record.insert(name, value);
                        }
                    } else if path.len() == depth {
                        item_depth = None;
                    }
                }
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match result_code.as_deref() {
        Some(SUCCESS_CODE) => {}
        Some(code) => {
            return Err(FetchError::Rejected {
                code: code.to_string(),
                message: result_msg.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        None => {
            return Err(FetchError::Rejected {
                code: "missing".to_string(),
                message: result_msg
                    .unwrap_or_else(|| "response carried no result_Code".to_string()),
            });
        }
    }

    match record {
        Some(record) if !record.is_empty() => Ok(Fetched::Item(record)),
        // -- 🫙 an <item> with no children carries no data; same outcome
        // as no <item> at all
        _ => Ok(Fetched::Empty),
    }
}

fn append_text(
    path: &[String],
    item_depth: Option<usize>,
    field: &mut Option<(String, String)>,
    result_code: &mut Option<String>,
    result_msg: &mut Option<String>,
    text: String,
) {
    if let Some((_, value)) = field {
        value.push_str(&text);
        return;
    }
    if item_depth.is_some() {
        return;
    }
    match path.last().map(String::as_str) {
        Some("result_Code") if result_code.is_none() => *result_code = Some(text),
        Some("result_Msg") if result_msg.is_none() => *result_msg = Some(text),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 🧪 parser tests: one payload, one opinion, no network

    fn field(fetched: &Fetched, name: &str) -> String {
        match fetched {
            Fetched::Item(record) => record.get(name).unwrap_or_default().to_string(),
            Fetched::Empty => panic!("💀 Expected an item, got the void."),
        }
    }

    #[test]
    fn the_one_where_the_item_flattens_nicely() {
        let fetched = parse(
            "<result><result_Code>200</result_Code>\
             <item><a>1</a><b>x</b></item></result>",
        )
        .expect("💀 A textbook success payload should parse.");
        assert_eq!(field(&fetched, "a"), "1");
        assert_eq!(field(&fetched, "b"), "x");
    }

    #[test]
    fn the_one_where_the_status_hides_in_a_header() {
        let fetched = parse(
            "<response><header><result_Code>200</result_Code></header>\
             <body><items><item><stdg_Cd>1100000000</stdg_Cd>\
             <bjd_Nm>Seoul</bjd_Nm></item></items></body></response>",
        )
        .expect("💀 The wrapped envelope shape should parse too.");
        assert_eq!(field(&fetched, "stdg_Cd"), "1100000000");
        assert_eq!(field(&fetched, "bjd_Nm"), "Seoul");
    }

    #[test]
    fn the_one_where_the_api_says_no_and_explains_itself() {
        let err = parse(
            "<result><result_Code>400</result_Code>\
             <result_Msg>bad code</result_Msg><item><a>1</a></item></result>",
        )
        .unwrap_err();
        match err {
            FetchError::Rejected { code, message } => {
                assert_eq!(code, "400");
                assert_eq!(message, "bad code");
            }
            honestly_who_knows => {
                panic!("💀 Expected a rejection, got {honestly_who_knows:?}. Plot twist energy.")
            }
        }
    }

    #[test]
    fn the_one_where_the_api_says_no_without_elaborating() {
        let err = parse("<result><result_Code>500</result_Code></result>").unwrap_err();
        match err {
            FetchError::Rejected { code, message } => {
                assert_eq!(code, "500");
                assert_eq!(message, "unknown error");
            }
            honestly_who_knows => {
                panic!("💀 Expected a rejection, got {honestly_who_knows:?}.")
            }
        }
    }

    #[test]
    fn the_one_where_the_status_simply_never_shows_up() {
        // 🧪 no result_Code, no deal — even with a perfectly good item
        let err = parse("<result><item><a>1</a></item></result>").unwrap_err();
        assert!(matches!(err, FetchError::Rejected { code, .. } if code == "missing"));
    }

    #[test]
    fn the_one_where_success_arrives_empty_handed() {
        let fetched = parse("<result><result_Code>200</result_Code></result>")
            .expect("💀 200 with no item is still a parseable success.");
        assert_eq!(fetched, Fetched::Empty);
    }

    #[test]
    fn the_one_where_the_item_is_a_hollow_shell() {
        let fetched = parse("<result><result_Code>200</result_Code><item/></result>")
            .expect("💀 A self-closing item should parse.");
        assert_eq!(fetched, Fetched::Empty);
    }

    #[test]
    fn the_one_where_self_closing_children_still_count() {
        let fetched = parse(
            "<result><result_Code>200</result_Code>\
             <item><a>1</a><gap/></item></result>",
        )
        .expect("💀 Self-closing children should parse.");
        assert_eq!(field(&fetched, "a"), "1");
        assert_eq!(field(&fetched, "gap"), "");
    }

    #[test]
    fn the_one_where_only_the_first_item_gets_past_the_rope() {
        let fetched = parse(
            "<result><result_Code>200</result_Code>\
             <item><a>first</a></item><item><a>second</a></item></result>",
        )
        .expect("💀 Two items should still parse; we just only seat one.");
        assert_eq!(field(&fetched, "a"), "first");
    }

    #[test]
    fn the_one_where_grandchildren_stay_home() {
        let fetched = parse(
            "<result><result_Code>200</result_Code>\
             <item><a>1</a><wrap><inner>deep</inner></wrap></item></result>",
        )
        .expect("💀 Nested markup should parse.");
        assert_eq!(field(&fetched, "a"), "1");
        assert_eq!(field(&fetched, "wrap"), "deep");
        match &fetched {
            Fetched::Item(record) => assert!(record.get("inner").is_none()),
            Fetched::Empty => unreachable!(),
        }
    }

    #[test]
    fn the_one_where_the_xml_is_just_vibes() {
        let err = parse("<result><unclosed></result>").unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(_)));
    }
}
