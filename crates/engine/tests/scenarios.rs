//! End-to-end walks through the wired engine.

use chrono::Utc;
use proptest::prelude::*;

use storekeep_engine::Storekeep;
use storekeep_engine::catalog::{ArticleKind, ItemState};
use storekeep_engine::core::{DomainError, LocationId, ProviderId};
use storekeep_engine::ledger::{MovementFilter, MovementSort, PageRequest, SourceKind};
use storekeep_engine::loans::NewLoanLine;
use storekeep_engine::purchasing::NewPurchaseLine;
use storekeep_engine::service::{LeftoverAllocation, ServiceTarget};

fn article(keep: &Storekeep) -> storekeep_engine::core::ArticleId {
    keep.create_article("PVC pipe 32mm", "PVC-32", 450, ArticleKind::Stock, false)
        .unwrap()
        .id_typed()
}

#[test]
fn purchase_receipt_settles_pending_into_quantity() {
    let keep = Storekeep::new();
    let article_id = article(&keep);
    let location = LocationId::new();
    let now = Utc::now();

    let order = keep
        .purchasing()
        .create_order(
            ProviderId::new(),
            "PO-2031",
            vec![NewPurchaseLine {
                article_id,
                location: Some(location),
                ordered: 10,
                received_now: 0,
            }],
            now,
        )
        .unwrap();
    let line_id = order.lines()[0].id_typed();

    let row = keep.stock().existence(article_id, Some(location)).unwrap();
    assert_eq!((row.quantity, row.pending_to_deliver), (0, 10));

    keep.purchasing()
        .receive_partial(order.id_typed(), line_id, 4, now)
        .unwrap();
    let row = keep.stock().existence(article_id, Some(location)).unwrap();
    assert_eq!((row.quantity, row.pending_to_deliver), (4, 6));

    let err = keep
        .purchasing()
        .receive_partial(order.id_typed(), line_id, 7, now)
        .unwrap_err();
    assert!(matches!(err, DomainError::OverDelivery(_)));
    let row = keep.stock().existence(article_id, Some(location)).unwrap();
    assert_eq!((row.quantity, row.pending_to_deliver), (4, 6));

    let order = keep
        .purchasing()
        .receive_all(order.id_typed(), line_id, now)
        .unwrap();
    let row = keep.stock().existence(article_id, Some(location)).unwrap();
    assert_eq!((row.quantity, row.pending_to_deliver), (10, 0));
    assert_eq!(
        order.status(),
        storekeep_engine::purchasing::PurchaseOrderStatus::Done
    );
}

#[test]
fn service_order_consumes_stock_and_leaves_a_leftover() {
    let keep = Storekeep::new();
    let article_id = article(&keep);
    let site = LocationId::new();
    let now = Utc::now();

    let po = keep
        .purchasing()
        .create_order(
            ProviderId::new(),
            "PO-2032",
            vec![NewPurchaseLine {
                article_id,
                location: Some(site),
                ordered: 10,
                received_now: 10,
            }],
            now,
        )
        .unwrap();
    assert_eq!(
        po.status(),
        storekeep_engine::purchasing::PurchaseOrderStatus::Done
    );

    let so = keep
        .service()
        .open_order(ServiceTarget::Location(site), "replace risers", now)
        .unwrap();
    let so = keep
        .service()
        .assign_article(so.id_typed(), article_id, Some(site), 4, 1, now)
        .unwrap();
    assert_eq!(
        keep.stock().existence(article_id, Some(site)).unwrap().quantity,
        6
    );

    let line_id = so.article_lines()[0].id_typed();
    let scrap_bin = LocationId::new();
    let (_, leftovers) = keep
        .service()
        .close_order(
            so.id_typed(),
            &[LeftoverAllocation {
                line_id,
                qty: 3,
                location: Some(scrap_bin),
            }],
            now,
        )
        .unwrap();
    assert_eq!(leftovers.len(), 1);
    assert_eq!(leftovers[0].quantity(), 3);
    assert_eq!(leftovers[0].location, Some(scrap_bin));

    // Reuse in a second order draws down the leftover, not the row.
    let next = keep
        .service()
        .open_order(ServiceTarget::Location(site), "patch kitchen line", now)
        .unwrap();
    keep.service()
        .assign_leftover(next.id_typed(), leftovers[0].id_typed(), 2, now)
        .unwrap();
    assert_eq!(
        keep.service()
            .leftover_book()
            .get(leftovers[0].id_typed())
            .unwrap()
            .quantity(),
        1
    );
    assert_eq!(
        keep.stock().existence(article_id, Some(site)).unwrap().quantity,
        6
    );
}

#[test]
fn loans_share_availability_with_service_orders() {
    let keep = Storekeep::new();
    let article_id = article(&keep);
    let site = LocationId::new();
    let now = Utc::now();

    keep.purchasing()
        .create_order(
            ProviderId::new(),
            "PO-2033",
            vec![NewPurchaseLine {
                article_id,
                location: Some(site),
                ordered: 10,
                received_now: 10,
            }],
            now,
        )
        .unwrap();

    let so = keep
        .service()
        .open_order(ServiceTarget::Location(site), "service pass", now)
        .unwrap();
    keep.service()
        .assign_article(so.id_typed(), article_id, Some(site), 6, 6, now)
        .unwrap();

    // 4 on hand; a loan of 5 cannot open.
    assert_eq!(keep.loans().available_for_loan(article_id), 4);
    let err = keep
        .loans()
        .create_loan(
            "R. Ayala",
            Some(site),
            vec![NewLoanLine { article_id, lent: 5 }],
            now,
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::InsufficientStock(_)));

    let loan = keep
        .loans()
        .create_loan(
            "R. Ayala",
            Some(site),
            vec![NewLoanLine { article_id, lent: 3 }],
            now,
        )
        .unwrap();
    assert_eq!(keep.loans().available_for_loan(article_id), 1);
    // The lent quantity never left the existence row.
    assert_eq!(
        keep.stock().existence(article_id, Some(site)).unwrap().quantity,
        4
    );

    let line_id = loan.lines()[0].id_typed();
    keep.loans().return_all(loan.id_typed(), line_id).unwrap();
    assert_eq!(keep.loans().available_for_loan(article_id), 4);
}

#[test]
fn identified_unit_lifecycle_and_history() {
    let keep = Storekeep::new();
    let article_id = keep
        .create_article("Impact driver", "IMP-18", 18900, ArticleKind::Tool, true)
        .unwrap()
        .id_typed();
    let shop = LocationId::new();
    let now = Utc::now();

    keep.purchasing()
        .create_order(
            ProviderId::new(),
            "PO-2034",
            vec![NewPurchaseLine {
                article_id,
                location: Some(shop),
                ordered: 2,
                received_now: 2,
            }],
            now,
        )
        .unwrap();
    let unit = keep.items().register(article_id, "IMP-18-U1").unwrap();

    let so = keep
        .service()
        .open_order(ServiceTarget::Location(shop), "tooling for crew B", now)
        .unwrap();
    let so = keep
        .service()
        .assign_identified_item(so.id_typed(), unit.id_typed(), now)
        .unwrap();
    let assignment_id = so.item_assignments()[0].id_typed();
    keep.service()
        .mark_identified_delivered(so.id_typed(), assignment_id)
        .unwrap();
    keep.service().close_order(so.id_typed(), &[], now).unwrap();

    let history = keep.service().item_history(unit.id_typed()).unwrap();
    assert_eq!(history.orders.len(), 1);
    assert_eq!(history.current_target, Some(ServiceTarget::Location(shop)));

    // Review then retire: one unit leaves the row with an Out entry.
    keep.items()
        .begin_review(unit.id_typed(), "chuck seized")
        .unwrap();
    keep.items()
        .retire(unit.id_typed(), None, Some(shop), now)
        .unwrap();
    assert_eq!(
        keep.stock().existence(article_id, Some(shop)).unwrap().quantity,
        1
    );
    assert_eq!(
        keep.service().items_by_state(Some(ItemState::Retired)).len(),
        1
    );

    let page = keep.stock().query(
        &MovementFilter {
            source_kind: Some(SourceKind::IdentifiedItem),
            ..MovementFilter::default()
        },
        MovementSort::default(),
        PageRequest::default(),
    );
    assert_eq!(page.total, 1);

    // A retired unit cannot go out again until reinstated.
    let so2 = keep
        .service()
        .open_order(ServiceTarget::Location(shop), "tooling for crew C", now)
        .unwrap();
    let err = keep
        .service()
        .assign_identified_item(so2.id_typed(), unit.id_typed(), now)
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition(_)));

    keep.items()
        .reinstate(unit.id_typed(), Some(shop), now)
        .unwrap();
    keep.service()
        .assign_identified_item(so2.id_typed(), unit.id_typed(), now)
        .unwrap();
    assert_eq!(
        keep.stock().existence(article_id, Some(shop)).unwrap().quantity,
        2
    );
}

proptest! {
    // Whatever mix of receipts, assignments and corrections runs, the
    // on-hand total must equal the signed sum of the ledger.
    #[test]
    fn on_hand_total_always_equals_the_signed_ledger_sum(
        ops in proptest::collection::vec((0u8..3, 1i64..20), 1..40)
    ) {
        let keep = Storekeep::new();
        let article_id = keep
            .create_article("Threaded rod", "ROD-M8", 120, ArticleKind::Stock, false)
            .unwrap()
            .id_typed();
        let site = LocationId::new();
        let now = Utc::now();

        keep.purchasing()
            .create_order(
                ProviderId::new(),
                "PO-SEED",
                vec![NewPurchaseLine {
                    article_id,
                    location: Some(site),
                    ordered: 50,
                    received_now: 50,
                }],
                now,
            )
            .unwrap();

        for (op, qty) in ops {
            match op {
                0 => {
                    keep.purchasing()
                        .create_order(
                            ProviderId::new(),
                            "PO-X",
                            vec![NewPurchaseLine {
                                article_id,
                                location: Some(site),
                                ordered: qty,
                                received_now: qty,
                            }],
                            now,
                        )
                        .unwrap();
                }
                1 => {
                    let so = keep
                        .service()
                        .open_order(ServiceTarget::Location(site), "walk", now)
                        .unwrap();
                    // May legitimately run out; rejection must not move stock.
                    let _ = keep.service().assign_article(
                        so.id_typed(),
                        article_id,
                        Some(site),
                        qty,
                        0,
                        now,
                    );
                }
                _ => {
                    let _ = keep.stock().adjust(
                        article_id,
                        Some(site),
                        -qty,
                        storekeep_engine::ledger::MovementSource::IdentifiedItem(
                            storekeep_engine::core::IdentifiedItemId::new(),
                        ),
                        Some("count correction".into()),
                        now,
                    );
                }
            }

            let ledger_sum: i64 = keep
                .stock()
                .entries()
                .iter()
                .map(|e| e.signed_quantity())
                .sum();
            prop_assert_eq!(keep.stock().total_quantity(article_id), ledger_sum);
        }
    }
}
