//! XML dictionary source.
//!
//! ```xml
//! <diameter>
//!   <application id="4" type="auth" name="Credit Control" parent="0">
//!     <vendor id="10415" name="TGPP"/>
//!     <command code="272" short="CC" name="Credit-Control">
//!       <request><rule avp="Session-Id" required="true" max="1"/></request>
//!       <answer><rule avp="Result-Code" required="true" max="1"/></answer>
//!     </command>
//!     <avp name="CC-Request-Type" code="416" must="M" may="P" must-not="V" may-encrypt="Y">
//!       <data type="Enumerated"><item code="1" name="INITIAL_REQUEST"/></data>
//!     </avp>
//!   </application>
//! </diameter>
//! ```

use std::io::BufRead;

use serde::Deserialize;

use crate::error::{DictError, Result};
use crate::model::{
    Application, ApplicationDef, AvpDefinition, AvpFlagRules, Command, EnumItem, Rule, Vendor,
    UNDEFINED_VENDOR_ID,
};
use crate::source::DictionarySource;

#[derive(Debug, Deserialize)]
struct XmlDiameter {
    #[serde(rename = "application", default)]
    applications: Vec<XmlApplication>,
}

#[derive(Debug, Deserialize)]
struct XmlApplication {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@parent")]
    parent: Option<String>,
    #[serde(rename = "$value", default)]
    entries: Vec<XmlEntry>,
}

// Children may be interleaved in any order.
#[derive(Debug, Deserialize)]
enum XmlEntry {
    #[serde(rename = "vendor")]
    Vendor(XmlVendor),
    #[serde(rename = "command")]
    Command(XmlCommand),
    #[serde(rename = "avp")]
    Avp(XmlAvp),
}

#[derive(Debug, Deserialize)]
struct XmlVendor {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@name", default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct XmlCommand {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "@short", default)]
    short: String,
    #[serde(rename = "@name", default)]
    name: String,
    request: Option<XmlRuleSet>,
    answer: Option<XmlRuleSet>,
}

#[derive(Debug, Deserialize)]
struct XmlRuleSet {
    #[serde(rename = "rule", default)]
    rules: Vec<XmlRule>,
}

#[derive(Debug, Deserialize)]
struct XmlRule {
    #[serde(rename = "@avp")]
    avp: String,
    #[serde(rename = "@required", default)]
    required: String,
    #[serde(rename = "@min")]
    min: Option<String>,
    #[serde(rename = "@max")]
    max: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlAvp {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "@must", default)]
    must: String,
    #[serde(rename = "@may", default)]
    may: String,
    #[serde(rename = "@must-not", default)]
    must_not: String,
    #[serde(rename = "@may-encrypt", default)]
    may_encrypt: String,
    #[serde(rename = "@vendor-id")]
    vendor_id: Option<String>,
    data: XmlData,
}

#[derive(Debug, Deserialize)]
struct XmlData {
    #[serde(rename = "@type")]
    data_type: String,
    #[serde(rename = "$value", default)]
    entries: Vec<XmlDataEntry>,
}

#[derive(Debug, Deserialize)]
enum XmlDataEntry {
    #[serde(rename = "item")]
    Item(XmlItem),
    #[serde(rename = "rule")]
    Rule(XmlRule),
}

#[derive(Debug, Deserialize)]
struct XmlItem {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "@name")]
    name: String,
}

/// Dictionary source reading XML definitions
pub struct XmlSource<R> {
    reader: R,
}

impl<R: BufRead> XmlSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<'a> XmlSource<&'a [u8]> {
    pub fn from_xml(xml: &'a str) -> Self {
        Self::new(xml.as_bytes())
    }
}

impl<R: BufRead> DictionarySource for XmlSource<R> {
    fn read(self) -> Result<Vec<ApplicationDef>> {
        let doc: XmlDiameter =
            quick_xml::de::from_reader(self.reader).map_err(|e| DictError::Source(e.to_string()))?;

        doc.applications.into_iter().map(convert_application).collect()
    }
}

fn parse_num<T: std::str::FromStr>(attribute: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| DictError::InvalidAttribute {
        attribute,
        value: value.to_string(),
    })
}

fn parse_bool(attribute: &'static str, value: &str) -> Result<bool> {
    match value.trim() {
        // "-" marks an unset flag column
        "" | "-" | "false" | "N" => Ok(false),
        "true" | "Y" => Ok(true),
        other => Err(DictError::InvalidAttribute {
            attribute,
            value: other.to_string(),
        }),
    }
}

fn convert_application(xml: XmlApplication) -> Result<ApplicationDef> {
    let id: u32 = parse_num("id", &xml.id)?;
    let mut application = Application::new(id, xml.name).with_kind(xml.kind.parse()?);
    if let Some(parent) = xml.parent.as_deref() {
        application = application.with_parent(parse_num("parent", parent)?);
    }

    let mut avps = Vec::new();
    let mut commands = Vec::new();
    for entry in xml.entries {
        match entry {
            XmlEntry::Vendor(vendor) => application.vendors.push(Vendor {
                id: parse_num("vendor id", &vendor.id)?,
                name: vendor.name,
            }),
            XmlEntry::Command(cmd) => commands.push(convert_command(id, cmd)?),
            XmlEntry::Avp(avp) => avps.push(convert_avp(id, avp)?),
        }
    }

    Ok(ApplicationDef {
        application,
        avps,
        commands,
    })
}

fn convert_command(app_id: u32, xml: XmlCommand) -> Result<Command> {
    let code = parse_num("command code", &xml.code)?;
    let rules = |set: Option<XmlRuleSet>| -> Result<Vec<Rule>> {
        set.map(|s| s.rules)
            .unwrap_or_default()
            .into_iter()
            .map(|rule| convert_rule(app_id, code, rule))
            .collect()
    };

    Ok(Command {
        code,
        app_id,
        name: xml.name,
        short: xml.short,
        request: rules(xml.request)?,
        answer: rules(xml.answer)?,
    })
}

fn convert_rule(app_id: u32, code: u32, xml: XmlRule) -> Result<Rule> {
    let required = parse_bool("required", &xml.required)?;
    let min = match xml.min.as_deref() {
        Some(min) => parse_num("min", min)?,
        None => u32::from(required),
    };
    // max="0" is the historical spelling of "unbounded"
    let max = match xml.max.as_deref() {
        Some(max) => Some(parse_num::<u32>("max", max)?).filter(|&m| m > 0),
        None => None,
    };

    Ok(Rule {
        app_id,
        code,
        avp: xml.avp,
        required,
        min,
        max,
    })
}

fn convert_avp(app_id: u32, xml: XmlAvp) -> Result<AvpDefinition> {
    let code = parse_num("avp code", &xml.code)?;
    let vendor_id = match xml.vendor_id.as_deref() {
        Some(vendor) => parse_num("vendor-id", vendor)?,
        None => UNDEFINED_VENDOR_ID,
    };

    let mut items = Vec::new();
    let mut rules = Vec::new();
    for entry in xml.data.entries {
        match entry {
            XmlDataEntry::Item(item) => items.push(EnumItem {
                code: parse_num("item code", &item.code)?,
                name: item.name,
            }),
            XmlDataEntry::Rule(rule) => rules.push(convert_rule(app_id, code, rule)?),
        }
    }

    Ok(AvpDefinition {
        code,
        name: xml.name,
        vendor_id,
        data_type: xml.data.data_type.parse()?,
        flags: AvpFlagRules {
            must: xml.must,
            may: xml.may,
            must_not: xml.must_not,
            may_encrypt: parse_bool("may-encrypt", &xml.may_encrypt)?,
        },
        items,
        rules,
    })
}
