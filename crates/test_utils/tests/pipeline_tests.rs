//! End-to-end pipeline tests over in-memory ports
//!
//! Each test dispatches record saves through the locking dispatcher and
//! checks the delivered batches and the delivery state left behind.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use domain_milestone::{
    ChannelKey, ConfigOutcome, CriterionOperator, FingerprintInput, OutputStyle, SentValueStore, StaticFeatureFlags,
};
use domain_shipment::TrackedRecord;
use test_utils::{
    assert_documents_sent, assert_failed, assert_outcome, assert_xml_absent, assert_xml_count, assert_xml_value,
    identifier_list_strategy, instant_2015_strategy, xml_values, CompanyFixtures, ConfigBuilder, EntryBuilder,
    PipelineHarness, SecurityFilingBuilder, TemporalFixtures,
};

// =============================================================================
// Idempotence
// =============================================================================

mod idempotence_tests {
    use super::*;

    #[tokio::test]
    async fn test_unchanged_value_is_sent_once() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        let record = EntryBuilder::new()
            .master_bills(&["MAEU1"])
            .released_at(TemporalFixtures::release_at())
            .record();

        let first = harness.save(&record).await.unwrap();
        assert_documents_sent(&first, 1);

        let second = harness.save(&record).await.unwrap();
        assert_documents_sent(&second, 0);
        assert_outcome(&second, "ACME", &ConfigOutcome::NothingToSend);
        assert_eq!(second.configs[0].skipped_fields, vec!["release_date".to_string()]);

        assert_eq!(harness.delivered().await.len(), 1);
        assert_eq!(harness.delivery_records.save_count().await, 1);
    }

    #[tokio::test]
    async fn test_changed_value_is_sent_again() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        let released = TemporalFixtures::release_at();
        let mut entry = EntryBuilder::new().released_at(released).build();

        harness.save(&entry.clone().into()).await.unwrap();
        entry.release_date = Some(released + Duration::hours(2));
        let report = harness.save(&entry.into()).await.unwrap();

        assert_documents_sent(&report, 1);
        assert_eq!(harness.delivered().await.len(), 2);
        let xml = harness.last_xml().await.unwrap();
        assert_xml_value(&xml, "EventTime", "1230");
    }

    #[tokio::test]
    async fn test_channel_is_confirmed_after_grace() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        harness
            .save(&EntryBuilder::new().released_at(TemporalFixtures::release_at()).record())
            .await
            .unwrap();

        let stored = harness.delivery_records.all().await;
        assert_eq!(stored.len(), 1);
        let channel = &stored[0];
        assert_eq!(channel.channel, ChannelKey::new("ACME", "315_release_date", "VR"));
        let sent_at = channel.sent_at.unwrap();
        assert_eq!(channel.confirmed_at, Some(sent_at + Duration::minutes(1)));
        assert!(channel.fingerprint.is_some());
        assert!(channel.failure_message.is_none());
    }
}

// =============================================================================
// Timestamp Disambiguation
// =============================================================================

mod disambiguation_tests {
    use super::*;

    #[tokio::test]
    async fn test_midnight_resend_moves_to_next_minute() {
        let config = ConfigBuilder::entry("ACME")
            .event("available_date", "AV")
            .disambiguate()
            .build();
        let harness = PipelineHarness::new(vec![config.clone()]).await;
        let record = EntryBuilder::new()
            .available_on(TemporalFixtures::event_day())
            .record();

        harness.save(&record).await.unwrap();
        let xml = harness.last_xml().await.unwrap();
        assert_xml_value(&xml, "EventDate", "20151201");
        assert_xml_value(&xml, "EventTime", "0000");

        let unchanged = harness.save(&record).await.unwrap();
        assert_documents_sent(&unchanged, 0);

        // A new salt changes the fingerprint and forces a resend.
        let mut salted = config;
        salted.fingerprint_inputs.push(FingerprintInput::Salt("reset-1".to_string()));
        harness.configs.insert(salted).await;

        let resent = harness.save(&record).await.unwrap();
        assert_documents_sent(&resent, 1);
        let xml = harness.last_xml().await.unwrap();
        assert_xml_value(&xml, "EventDate", "20151201");
        assert_xml_value(&xml, "EventTime", "0001");

        let again = harness.save(&record).await.unwrap();
        assert_documents_sent(&again, 0);

        let stored = harness.delivery_records.all().await;
        assert_eq!(stored[0].ledger.offsets(TemporalFixtures::event_day()), &[0, 1]);
    }

    #[tokio::test]
    async fn test_last_minute_resend_stays_on_day() {
        let config = ConfigBuilder::entry("ACME")
            .event("release_date", "VR")
            .disambiguate()
            .build();
        let harness = PipelineHarness::new(vec![config.clone()]).await;
        let record = EntryBuilder::new()
            .released_at(TemporalFixtures::last_minute_of_day())
            .record();

        harness.save(&record).await.unwrap();
        assert_xml_value(&harness.last_xml().await.unwrap(), "EventTime", "2359");

        let mut salted = config;
        salted.fingerprint_inputs.push(FingerprintInput::Salt("reset-1".to_string()));
        harness.configs.insert(salted).await;

        harness.save(&record).await.unwrap();
        let xml = harness.last_xml().await.unwrap();
        assert_xml_value(&xml, "EventDate", "20151201");
        assert_xml_value(&xml, "EventTime", "2358");
    }

    #[tokio::test]
    async fn test_date_only_without_disambiguation_reports_midnight() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME")
            .date_event("release_date", "VR")
            .build()])
        .await;

        harness
            .save(&EntryBuilder::new().released_at(TemporalFixtures::release_at()).record())
            .await
            .unwrap();

        let xml = harness.last_xml().await.unwrap();
        assert_xml_value(&xml, "EventDate", "20151201");
        assert_xml_value(&xml, "EventTime", "0000");
    }

    #[tokio::test]
    async fn test_field_timezone_overrides_module_timezone() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME")
            .event_in("release_date", "VR", TemporalFixtures::central())
            .build()])
        .await;

        harness
            .save(&EntryBuilder::new().released_at(TemporalFixtures::release_at()).record())
            .await
            .unwrap();

        assert_xml_value(&harness.last_xml().await.unwrap(), "EventTime", "0930");
    }
}

// =============================================================================
// Batching and Splitting
// =============================================================================

mod batching_tests {
    use super::*;

    #[tokio::test]
    async fn test_master_bill_and_container_pairs_share_one_file() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME")
            .event("release_date", "VR")
            .output_style(OutputStyle::PerMasterBillAndContainer)
            .build()])
        .await;
        let record = EntryBuilder::new()
            .master_bills(&["A", "B"])
            .containers(&["E", "F"])
            .released_at(TemporalFixtures::release_at())
            .record();

        let report = harness.save(&record).await.unwrap();

        assert_documents_sent(&report, 4);
        assert_eq!(harness.delivered().await.len(), 1);
        let xml = harness.last_xml().await.unwrap();
        assert_xml_count(&xml, "Document", 4);
        assert_eq!(xml_values(&xml, "MasterBill"), vec!["A", "A", "B", "B"]);
        assert_eq!(xml_values(&xml, "Container"), vec!["E", "F", "E", "F"]);
    }

    #[tokio::test]
    async fn test_several_fields_go_out_in_one_batch() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME")
            .event("release_date", "VR")
            .event("arrival_date", "VA")
            .event("freight_pickup_date", "FP")
            .build()])
        .await;
        let record = EntryBuilder::new()
            .released_at(TemporalFixtures::release_at())
            .arrived_at(TemporalFixtures::release_at() - Duration::days(1))
            .record();

        let report = harness.save(&record).await.unwrap();

        assert_documents_sent(&report, 2);
        assert_eq!(report.configs[0].skipped_fields, vec!["freight_pickup_date".to_string()]);
        let xml = harness.last_xml().await.unwrap();
        assert_eq!(xml_values(&xml, "EventCode"), vec!["VR", "VA"]);
        assert_eq!(harness.delivery_records.save_count().await, 2);
    }

    #[tokio::test]
    async fn test_standard_style_lists_every_identifier() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        let record = EntryBuilder::new()
            .master_bills(&["A", "B"])
            .house_bills(&["H1"])
            .containers(&["E", "F"])
            .released_at(TemporalFixtures::release_at())
            .record();

        harness.save(&record).await.unwrap();

        let xml = harness.last_xml().await.unwrap();
        assert_xml_count(&xml, "Document", 1);
        assert_xml_count(&xml, "MasterBill", 2);
        assert_xml_count(&xml, "Container", 2);
        assert_xml_value(&xml, "HouseBill", "H1");
        assert_xml_absent(&xml, "PurchaseOrders");
    }

    #[tokio::test]
    async fn test_file_named_for_partner() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        harness
            .save(&EntryBuilder::new().released_at(TemporalFixtures::release_at()).record())
            .await
            .unwrap();

        let delivered = harness.delivered().await;
        assert_eq!(delivered[0].folder, "ACME");
        assert!(delivered[0].file_name.starts_with("315_ACME_"));
        assert!(delivered[0].file_name.ends_with(".xml"));
    }
}

// =============================================================================
// Testing Configurations
// =============================================================================

mod testing_config_tests {
    use super::*;

    #[tokio::test]
    async fn test_testing_config_writes_test_folder_without_state() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME")
            .event("release_date", "VR")
            .testing()
            .build()])
        .await;
        let record = EntryBuilder::new().released_at(TemporalFixtures::release_at()).record();

        harness.save(&record).await.unwrap();
        let again = harness.save(&record).await.unwrap();

        assert_documents_sent(&again, 1);
        let delivered = harness.delivered().await;
        assert_eq!(delivered.len(), 2);
        assert!(delivered.iter().all(|d| d.folder == "ACME_test"));
        assert_eq!(harness.delivery_records.save_count().await, 0);
        assert!(harness.sent_values.is_empty().await);
    }

    #[tokio::test]
    async fn test_testing_config_does_not_disturb_live_channel() {
        let harness = PipelineHarness::new(vec![
            ConfigBuilder::entry("ACME").event("release_date", "VR").build(),
            ConfigBuilder::entry("ACME").event("release_date", "VR").testing().build(),
        ])
        .await;
        let record = EntryBuilder::new().released_at(TemporalFixtures::release_at()).record();

        harness.save(&record).await.unwrap();
        let second = harness.save(&record).await.unwrap();

        let live = second.configs.iter().find(|c| !c.testing).unwrap();
        let test = second.configs.iter().find(|c| c.testing).unwrap();
        assert_eq!(live.outcome, ConfigOutcome::NothingToSend);
        assert_eq!(test.outcome, ConfigOutcome::Sent { documents: 1 });
    }
}

// =============================================================================
// Failure Handling
// =============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_delivery_persists_nothing_and_retries() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        let record = EntryBuilder::new().released_at(TemporalFixtures::release_at()).record();

        harness.delivery.fail_with(Some("share unavailable".to_string())).await;
        let failed = harness.save(&record).await.unwrap();

        assert_failed(&failed, "ACME");
        assert_eq!(harness.delivery_records.save_count().await, 0);
        assert!(harness.sent_values.is_empty().await);

        harness.delivery.fail_with(None).await;
        let retried = harness.save(&record).await.unwrap();

        assert_documents_sent(&retried, 1);
        assert_eq!(harness.delivery_records.save_count().await, 1);
    }

    #[tokio::test]
    async fn test_one_bad_config_does_not_block_others() {
        let harness = PipelineHarness::new(vec![
            ConfigBuilder::entry("BAD").event("not_a_field", "XX").build(),
            ConfigBuilder::entry("EMPTY").build(),
            ConfigBuilder::entry("ACME").event("release_date", "VR").build(),
        ])
        .await;
        let record = EntryBuilder::new().released_at(TemporalFixtures::release_at()).record();

        let report = harness.save(&record).await.unwrap();

        assert!(report.accepted);
        assert_failed(&report, "BAD");
        assert_failed(&report, "EMPTY");
        assert_outcome(&report, "ACME", &ConfigOutcome::Sent { documents: 1 });
        assert_eq!(report.failures().count(), 2);
    }

    #[tokio::test]
    async fn test_canadian_port_without_un_locode_fails() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        let record = EntryBuilder::new()
            .canadian()
            .ports(Some("0809"), None, None)
            .released_at(TemporalFixtures::release_at())
            .record();

        let report = harness.save(&record).await.unwrap();

        assert_failed(&report, "ACME");
        let ConfigOutcome::Failed { message } = &report.configs[0].outcome else {
            unreachable!();
        };
        assert!(message.contains("UN/LOCODE"), "{}", message);
        assert!(harness.delivered().await.is_empty());
        assert_eq!(harness.delivery_records.save_count().await, 0);
    }

    #[tokio::test]
    async fn test_unconfirmed_batch_is_reported_and_resent() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME")
            .event("release_date", "VR")
            .event("arrival_date", "VA")
            .build()])
        .await;
        let record = EntryBuilder::new()
            .released_at(TemporalFixtures::release_at())
            .arrived_at(TemporalFixtures::release_at())
            .record();

        harness.delivery_records.fail_with(Some("connection reset".to_string())).await;
        let report = harness.save(&record).await.unwrap();

        let ConfigOutcome::Unconfirmed { documents, message } = &report.configs[0].outcome else {
            panic!("expected unconfirmed, got {:?}", report.configs[0].outcome);
        };
        assert_eq!(*documents, 2);
        assert!(message.contains("confirmation failed"), "{}", message);
        assert_eq!(report.documents_sent(), 2);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(harness.delivered().await.len(), 1);
        // Neither channel was stored
        assert!(harness.delivery_records.all().await.is_empty());

        harness.delivery_records.fail_with(None).await;
        let resent = harness.save(&record).await.unwrap();
        assert_outcome(&resent, "ACME", &ConfigOutcome::Sent { documents: 2 });
        assert_eq!(harness.delivery_records.all().await.len(), 2);
    }
}

// =============================================================================
// Partner Channels
// =============================================================================

mod partner_channel_tests {
    use super::*;

    #[tokio::test]
    async fn test_partners_on_same_field_each_receive_the_event() {
        let harness = PipelineHarness::new(vec![
            ConfigBuilder::entry("PARTNER_A").match_customer("ACME").event("release_date", "VR").build(),
            ConfigBuilder::entry("PARTNER_B").match_customer("ACME").event("release_date", "VR").build(),
        ])
        .await;
        let record = EntryBuilder::new()
            .customer("ACME")
            .released_at(TemporalFixtures::release_at())
            .record();

        let report = harness.save(&record).await.unwrap();

        assert_outcome(&report, "PARTNER_A", &ConfigOutcome::Sent { documents: 1 });
        assert_outcome(&report, "PARTNER_B", &ConfigOutcome::Sent { documents: 1 });
        let mut folders: Vec<String> = harness.delivered().await.into_iter().map(|d| d.folder).collect();
        folders.sort();
        assert_eq!(folders, vec!["PARTNER_A", "PARTNER_B"]);

        let mut partners: Vec<String> = harness
            .delivery_records
            .all()
            .await
            .into_iter()
            .map(|d| d.channel.partner_key)
            .collect();
        partners.sort();
        assert_eq!(partners, vec!["PARTNER_A", "PARTNER_B"]);

        let again = harness.save(&record).await.unwrap();
        assert_documents_sent(&again, 0);
        assert_eq!(harness.delivered().await.len(), 2);
    }

    #[tokio::test]
    async fn test_partners_with_different_fingerprints_settle() {
        let harness = PipelineHarness::new(vec![
            ConfigBuilder::entry("PARTNER_A").event("release_date", "VR").build(),
            ConfigBuilder::entry("PARTNER_B")
                .event("release_date", "VR")
                .fingerprint(FingerprintInput::Salt("b".to_string()))
                .build(),
        ])
        .await;
        let record = EntryBuilder::new().released_at(TemporalFixtures::release_at()).record();

        assert_documents_sent(&harness.save(&record).await.unwrap(), 2);
        for _ in 0..3 {
            assert_documents_sent(&harness.save(&record).await.unwrap(), 0);
        }
        assert_eq!(harness.delivered().await.len(), 2);
    }

    #[tokio::test]
    async fn test_two_codes_on_one_field_keep_their_own_channels() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME")
            .disambiguate()
            .event("release_date", "VR")
            .event("release_date", "VA")
            .build()])
        .await;
        let record = EntryBuilder::new().released_at(TemporalFixtures::release_at()).record();

        let report = harness.save(&record).await.unwrap();

        assert_outcome(&report, "ACME", &ConfigOutcome::Sent { documents: 2 });
        assert_eq!(harness.delivered().await.len(), 1);
        let xml = harness.last_xml().await.unwrap();
        assert_eq!(xml_values(&xml, "EventCode"), vec!["VR", "VA"]);

        let mut codes: Vec<String> = harness
            .delivery_records
            .all()
            .await
            .into_iter()
            .map(|d| d.channel.event_code)
            .collect();
        codes.sort();
        assert_eq!(codes, vec!["VA", "VR"]);

        let again = harness.save(&record).await.unwrap();
        assert_documents_sent(&again, 0);
    }
}

// =============================================================================
// Port Locations
// =============================================================================

mod port_location_tests {
    use super::*;

    #[tokio::test]
    async fn test_canadian_ports_use_un_locode() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        let record = EntryBuilder::new()
            .canadian()
            .ports(Some("0495"), Some("57035"), Some("0809"))
            .released_at(TemporalFixtures::release_at())
            .record();

        harness.save(&record).await.unwrap();

        let xml = harness.last_xml().await.unwrap();
        assert_xml_value(&xml, "PortOfEntry", "CATOR");
        assert_xml_value(&xml, "PortOfLading", "57035");
        assert_xml_value(&xml, "PortOfUnlading", "0809");
        assert!(xml.contains(r#"<Location type="PortOfEntry">"#), "{}", xml);
        assert!(xml.contains(r#"<Location type="PortOfUnlading">"#), "{}", xml);
        assert_eq!(xml_values(&xml, "Code"), vec!["CATOR", "57035", "0809"]);
        assert_eq!(xml_values(&xml, "CodeType"), vec!["UNLocode", "ScheduleK", "CBSA"]);
        assert_xml_value(&xml, "Name", "Toronto");
    }

    #[tokio::test]
    async fn test_unknown_port_reports_code_only() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        let record = EntryBuilder::new()
            .ports(Some("1001"), Some("99999"), None)
            .released_at(TemporalFixtures::release_at())
            .record();

        harness.save(&record).await.unwrap();

        let xml = harness.last_xml().await.unwrap();
        assert!(xml.contains(r#"<Location type="PortOfLading">"#));
        assert_eq!(xml_values(&xml, "Code"), vec!["1001", "99999"]);
        // The unknown port has no scheme to report
        assert_eq!(xml_values(&xml, "CodeType"), vec!["ScheduleD"]);
        assert_xml_absent(&xml, "PortOfUnlading");
    }
}

// =============================================================================
// Acceptance
// =============================================================================

mod acceptance_tests {
    use super::*;

    #[tokio::test]
    async fn test_no_matching_config_rejects() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("OTHER")
            .match_customer("OTHER")
            .event("release_date", "VR")
            .build()])
        .await;

        let report = harness
            .save(&EntryBuilder::new().released_at(TemporalFixtures::release_at()).record())
            .await
            .unwrap();

        assert!(!report.accepted);
        assert!(report.configs.is_empty());
        assert!(harness.delivered().await.is_empty());
    }

    #[tokio::test]
    async fn test_record_without_customer_number_rejects() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;

        let report = harness
            .save(
                &EntryBuilder::new()
                    .without_customer()
                    .released_at(TemporalFixtures::release_at())
                    .record(),
            )
            .await
            .unwrap();

        assert!(!report.accepted);
    }

    #[tokio::test]
    async fn test_parent_account_config_matches_importer() {
        let (parent, importer) = CompanyFixtures::parent_and_importer();
        let importer_id = importer.id;
        let harness = PipelineHarness::with(
            vec![ConfigBuilder::entry("PARENT")
                .match_parent("PARENT1")
                .event("release_date", "VR")
                .build()],
            vec![parent, importer],
            StaticFeatureFlags::all_enabled(),
        )
        .await;
        let record = EntryBuilder::new()
            .customer("SUBSIDIARY")
            .importer(importer_id)
            .released_at(TemporalFixtures::release_at())
            .record();

        let report = harness.save(&record).await.unwrap();

        assert_outcome(&report, "PARENT", &ConfigOutcome::Sent { documents: 1 });
    }

    #[tokio::test]
    async fn test_disabled_module_rejects() {
        let harness = PipelineHarness::with(
            vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()],
            Vec::new(),
            StaticFeatureFlags {
                entry: false,
                security_filing: true,
            },
        )
        .await;

        let report = harness
            .save(&EntryBuilder::new().released_at(TemporalFixtures::release_at()).record())
            .await
            .unwrap();

        assert!(!report.accepted);
    }

    #[tokio::test]
    async fn test_disabled_config_is_ignored() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME")
            .event("release_date", "VR")
            .disabled()
            .build()])
        .await;

        let report = harness
            .save(&EntryBuilder::new().released_at(TemporalFixtures::release_at()).record())
            .await
            .unwrap();

        assert!(!report.accepted);
    }

    #[tokio::test]
    async fn test_criteria_gate_each_config() {
        let harness = PipelineHarness::new(vec![
            ConfigBuilder::entry("OCEAN")
                .event("release_date", "VR")
                .criterion("transport_mode_code", CriterionOperator::In, "10\n11")
                .build(),
            ConfigBuilder::entry("AIR")
                .event("release_date", "VR")
                .criterion("transport_mode_code", CriterionOperator::Equals, "40")
                .build(),
        ])
        .await;
        let record = EntryBuilder::new()
            .transport_mode("11")
            .released_at(TemporalFixtures::release_at())
            .record();

        let report = harness.save(&record).await.unwrap();

        assert_outcome(&report, "OCEAN", &ConfigOutcome::Sent { documents: 1 });
        assert_outcome(&report, "AIR", &ConfigOutcome::CriteriaNotMet);
    }
}

// =============================================================================
// Security Filings and Sent Values
// =============================================================================

mod security_filing_tests {
    use super::*;

    #[tokio::test]
    async fn test_security_filing_document() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::security_filing("ACME")
            .event("first_sent_date", "IS")
            .build()])
        .await;
        let record = SecurityFilingBuilder::new()
            .transaction_number("TX-77")
            .scac("MAEU")
            .master_bills(&["MAEU123"])
            .first_sent_at(TemporalFixtures::release_at())
            .record();

        harness.save(&record).await.unwrap();

        let xml = harness.last_xml().await.unwrap();
        assert_xml_value(&xml, "BrokerReference", "ISF-2001");
        assert_xml_value(&xml, "EntryNumber", "TX-77");
        assert_xml_value(&xml, "CarrierCode", "MAEU");
        assert_xml_value(&xml, "EventCode", "IS");
        assert_xml_absent(&xml, "CargoControlNumber");

        let stored = harness.delivery_records.all().await;
        assert_eq!(stored[0].channel.trading_partner, "315_isf_first_sent_date");
    }

    #[tokio::test]
    async fn test_sent_values_are_recorded() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        let record = EntryBuilder::new().released_at(TemporalFixtures::release_at()).record();

        harness.save(&record).await.unwrap();

        let value = harness
            .sent_values
            .last_sent(&record.record_ref(), "VR")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value.event_at, TemporalFixtures::release_at());
        assert_eq!(harness.sent_values.len().await, 1);
    }
}

// =============================================================================
// Concurrency
// =============================================================================

mod concurrency_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_send_one_batch() {
        let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
        let record = EntryBuilder::new().released_at(TemporalFixtures::release_at()).record();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let harness = harness.clone();
                let record = record.clone();
                tokio::spawn(async move { harness.save(&record).await })
            })
            .collect();

        let mut documents = 0;
        for handle in handles {
            documents += handle.await.unwrap().unwrap().documents_sent();
        }

        assert_eq!(documents, 1);
        assert_eq!(harness.delivered().await.len(), 1);
    }
}

// =============================================================================
// Property-Based Tests
// =============================================================================

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_master_bill_container_pair_is_sent(
        masters in identifier_list_strategy("MB", 4),
        containers in identifier_list_strategy("CN", 4),
    ) {
        let (documents, files) = block_on(async {
            let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME")
                .event("release_date", "VR")
                .output_style(OutputStyle::PerMasterBillAndContainer)
                .build()])
            .await;
            let masters: Vec<&str> = masters.iter().map(String::as_str).collect();
            let containers: Vec<&str> = containers.iter().map(String::as_str).collect();
            let record = EntryBuilder::new()
                .master_bills(&masters)
                .containers(&containers)
                .released_at(TemporalFixtures::release_at())
                .record();

            let report = harness.save(&record).await.unwrap();
            (report.documents_sent(), harness.delivered().await.len())
        });

        prop_assert_eq!(documents, masters.len().max(1) * containers.len().max(1));
        prop_assert_eq!(files, 1);
    }

    #[test]
    fn event_time_is_local_wall_clock(at in instant_2015_strategy()) {
        let xml = block_on(async {
            let harness = PipelineHarness::new(vec![ConfigBuilder::entry("ACME").event("release_date", "VR").build()]).await;
            harness.save(&EntryBuilder::new().released_at(at).record()).await.unwrap();
            harness.last_xml().await.unwrap()
        });

        let local = TemporalFixtures::eastern().to_local(at);
        prop_assert_eq!(xml_values(&xml, "EventDate"), vec![local.format("%Y%m%d").to_string()]);
        prop_assert_eq!(xml_values(&xml, "EventTime"), vec![local.format("%H%M").to_string()]);
    }
}

#[test]
fn test_fixture_release_is_utc() {
    assert_eq!(TemporalFixtures::release_at(), Utc.with_ymd_and_hms(2015, 12, 1, 15, 30, 0).unwrap());
}
