use indoc::indoc;
use rust_decimal::Decimal;
use sqlbind::{Connection, Database, Params, Record, StatementError, Value};
use time::{Date, macros::date};
use uuid::Uuid;

#[derive(Record, Debug, PartialEq)]
#[record(name = "Invoice")]
struct Invoice {
    id: i64,
    #[record(column = "client_name")]
    client: String,
    amount: Decimal,
    issued: Date,
    reference: Option<Uuid>,
    note: Option<String>,
}

#[derive(Record, Debug)]
#[record(name = "Total")]
struct Total {
    client_name: String,
    invoices: i64,
}

pub fn invoices<C: Connection>(db: &mut Database<C>) {
    // Setup
    db.query("DROP TABLE IF EXISTS invoices")
        .expect("Failed to drop the invoices table");
    db.query(indoc! {"
        CREATE TABLE invoices (
            id INTEGER PRIMARY KEY,
            client_name TEXT NOT NULL,
            amount TEXT NOT NULL,
            issued TEXT NOT NULL,
            reference TEXT,
            note TEXT
        )
    "})
    .expect("Failed to create the invoices table");
    db.register::<Invoice>();

    let reference = Uuid::from_u128(0x5e915574_bb30_4430_98cf_c5854f61fbbd);
    let mut insert = db
        .prepare(indoc! {"
            INSERT INTO invoices (client_name, amount, issued, reference, note)
            VALUES (?client, ?amount, ?issued, ?reference, ?note)
        "})
        .expect("Should prepare");
    for (client, amount, issued, reference, note) in [
        (
            "ACME",
            Decimal::new(1250, 2),
            date!(2025 - 03 - 01),
            Some(reference),
            None,
        ),
        (
            "ACME",
            Decimal::new(-75, 1),
            date!(2025 - 03 - 02),
            None,
            Some("refund"),
        ),
        (
            "Initech",
            Decimal::new(100, 0),
            date!(2024 - 12 - 31),
            None,
            None,
        ),
    ] {
        insert
            .bind("client", client)
            .bind("amount", amount)
            .bind("issued", issued)
            .bind("reference", reference)
            .bind("note", note.map(String::from));
        assert!(insert.insert(()).expect("Failed to insert").succeeded());
    }
    drop(insert);

    // Typed records
    let invoices = db
        .fetch_all_as::<Invoice>(
            "SELECT * FROM invoices WHERE client_name = ?client ORDER BY id",
            Params::named([("client", "ACME")]),
        )
        .expect("Failed to fetch the invoices");
    assert_eq!(
        invoices,
        [
            Invoice {
                id: 1,
                client: "ACME".into(),
                amount: Decimal::new(1250, 2),
                issued: date!(2025 - 03 - 01),
                reference: Some(reference),
                note: None,
            },
            Invoice {
                id: 2,
                client: "ACME".into(),
                amount: Decimal::new(-75, 1),
                issued: date!(2025 - 03 - 02),
                reference: None,
                note: Some("refund".into()),
            },
        ]
    );

    // Registered record type selected by name
    let invoice = db
        .fetch_one("SELECT * FROM invoices WHERE id = ?", 3, Some("Invoice"))
        .expect("Failed to fetch invoice 3")
        .expect("Invoice 3 exists");
    assert_eq!(invoice.type_name(), "Invoice");
    assert_eq!(
        Invoice::from_model(invoice).expect("Is an invoice").client,
        "Initech"
    );

    // Subset of the columns
    let totals = db
        .fetch_all_as::<Total>(
            indoc! {"
                SELECT client_name, COUNT(*) AS invoices
                FROM invoices
                GROUP BY client_name
                ORDER BY client_name
            "},
            (),
        )
        .expect("Failed to fetch the totals");
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].client_name, "ACME");
    assert_eq!(totals[0].invoices, 2);
    assert_eq!(totals[1].client_name, "Initech");
    assert_eq!(totals[1].invoices, 1);

    // A column the record does not declare
    let error = db
        .fetch_all_as::<Total>("SELECT client_name, amount FROM invoices", ())
        .expect_err("`amount` is not part of Total");
    assert_eq!(
        StatementError::of(&error),
        Some(&StatementError::UnknownField {
            record: "Total".into(),
            field: "amount".into(),
        })
    );
    let error = db
        .fetch_all("SELECT * FROM invoices", (), Some("Missing"))
        .expect_err("`Missing` is not registered");
    assert!(matches!(
        StatementError::of(&error),
        Some(StatementError::InvalidResultType { name }) if name == "Missing"
    ));

    // Model values can be read and changed by column name
    let mut model = db
        .fetch_one("SELECT id, note FROM invoices WHERE id = ?", 2, None)
        .expect("Failed to fetch invoice 2")
        .expect("Invoice 2 exists");
    assert_eq!(
        model.set("note", "changed"),
        Some(Value::Varchar(Some("refund".into())))
    );
    assert_eq!(model.get_as::<String>("note").expect("Text"), "changed");
}
