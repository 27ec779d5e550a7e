//! 315 batch XML
//!
//! One `Batch` root per delivered file, one `Document` per [`Data315`].
//! Optional values are omitted rather than written empty; identifier lists
//! are written as a wrapper element with one child per value.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::data::Data315;
use crate::error::MilestoneError;
use crate::port_location::PortLocation;

type XmlWriter = Writer<Vec<u8>>;

/// Serializes 315 payloads into batch documents
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlGenerator;

impl XmlGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Renders every payload into one `Batch` document
    pub fn render_batch(&self, documents: &[Data315]) -> Result<Vec<u8>, MilestoneError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(MilestoneError::xml)?;

        start(&mut writer, "Batch")?;
        for document in documents {
            write_document(&mut writer, document)?;
        }
        end(&mut writer, "Batch")?;

        Ok(writer.into_inner())
    }
}

fn write_document(writer: &mut XmlWriter, data: &Data315) -> Result<(), MilestoneError> {
    let header = &data.header;
    start(writer, "Document")?;

    text(writer, "BrokerReference", Some(header.broker_reference.as_str()))?;
    text(writer, "EntryNumber", header.entry_number.as_deref())?;
    text(writer, "CustomerNumber", header.customer_number.as_deref())?;
    text(writer, "ShipMode", header.ship_mode.as_deref())?;
    text(writer, "ServiceType", header.service_type.as_deref())?;
    text(writer, "CarrierCode", header.carrier_code.as_deref())?;
    text(writer, "CarrierName", header.carrier_name.as_deref())?;
    text(writer, "Vessel", header.vessel.as_deref())?;
    text(writer, "VoyageNumber", header.voyage.as_deref())?;

    location(writer, "PortOfEntry", header.port_of_entry.as_ref())?;
    location(writer, "PortOfLading", header.port_of_lading.as_ref())?;
    location(writer, "PortOfUnlading", header.port_of_unlading.as_ref())?;

    text(writer, "CargoControlNumber", data.cargo_control_number().as_deref())?;
    list(writer, "MasterBills", "MasterBill", &data.identifiers.master_bills)?;
    list(writer, "HouseBills", "HouseBill", &data.identifiers.house_bills)?;
    list(writer, "Containers", "Container", &data.identifiers.containers)?;
    list(writer, "PurchaseOrders", "PurchaseOrder", &data.identifiers.po_numbers)?;

    start(writer, "Event")?;
    text(writer, "EventCode", Some(data.event.code.as_str()))?;
    text(writer, "EventDate", Some(data.event.event_date().as_str()))?;
    text(writer, "EventTime", Some(data.event.event_time().as_str()))?;
    end(writer, "Event")?;

    end(writer, "Document")
}

/// `<PortOfX>code</PortOfX>` followed by `<Location type="PortOfX">`
fn location(writer: &mut XmlWriter, role: &str, port: Option<&PortLocation>) -> Result<(), MilestoneError> {
    let Some(port) = port else {
        return Ok(());
    };

    text(writer, role, Some(port.code.as_str()))?;

    let mut element = BytesStart::new("Location");
    element.push_attribute(("type", role));
    writer
        .write_event(Event::Start(element))
        .map_err(MilestoneError::xml)?;

    text(writer, "Code", Some(port.code.as_str()))?;
    text(writer, "CodeType", port.code_type.map(|c| c.as_str()))?;
    if let Some(record) = &port.location {
        text(writer, "Name", record.name.as_deref())?;
        text(writer, "Address1", record.address_1.as_deref())?;
        text(writer, "Address2", record.address_2.as_deref())?;
        text(writer, "Address3", record.address_3.as_deref())?;
        text(writer, "City", record.city.as_deref())?;
        text(writer, "State", record.state.as_deref())?;
        text(writer, "PostalCode", record.postal_code.as_deref())?;
        text(writer, "Country", record.country.as_deref())?;
    }

    end(writer, "Location")
}

fn list(writer: &mut XmlWriter, wrapper: &str, item: &str, values: &[String]) -> Result<(), MilestoneError> {
    if values.is_empty() {
        return Ok(());
    }
    start(writer, wrapper)?;
    for value in values {
        text(writer, item, Some(value.as_str()))?;
    }
    end(writer, wrapper)
}

fn text(writer: &mut XmlWriter, name: &str, value: Option<&str>) -> Result<(), MilestoneError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(MilestoneError::xml)?;
    end(writer, name)
}

fn start(writer: &mut XmlWriter, name: &str) -> Result<(), MilestoneError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(MilestoneError::xml)
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<(), MilestoneError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(MilestoneError::xml)
}
