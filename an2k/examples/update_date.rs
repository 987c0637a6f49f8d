//! Load a transaction, rewrite the year of its date field and save it

use an2k::Transaction;
use tracing_subscriber::EnvFilter;

fn main() -> an2k::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let input = std::env::var("AN2K_FILE").unwrap_or_else(|_| "pass-all-supported-types.an2".to_string());
    let output = std::env::var("AN2K_OUTPUT").unwrap_or_else(|_| "saved-transaction.an2".to_string());

    println!("Loading transaction: {}", input);
    let mut tr = Transaction::from_file(&input)?;
    println!("{}", tr.summary()?);

    println!("Access record n.0:");
    let header = tr.get(0)?;
    println!("Record type: {}", header.record_type());
    match header.idc() {
        Ok(idc) => println!("IDC: {}", idc),
        Err(_) => println!("IDC: none"),
    }
    println!("Field count: {}", header.count());

    // 1.005 DAT sits at index 4 in the sample transaction
    println!("Field access by index: {}", header.field(4)?.description());
    println!("Field access by field number: {}", header.field_by_number(5)?.description());
    let dat = header.field_by_mnemonic("DAT")?;
    println!("Field access by field mnemonic: {}", dat.description());
    println!("Field string data: {}", dat.string_data());

    let dat = tr.get_mut(0)?.field_by_mnemonic_mut("DAT")?;
    let mut data = dat.data().to_vec();
    if data.len() < 4 {
        println!("DAT is too short to hold a year");
        return Ok(());
    }
    data[..4].copy_from_slice(b"2022");
    dat.set_data(data)?;
    println!("Field updated string data: {}", dat.string_data());

    println!("Saving transaction to {}", output);
    tr.to_file(&output)?;

    let reloaded = Transaction::from_file(&output)?;
    println!(
        "Re-opened transaction date: {}",
        reloaded.get(0)?.field_by_mnemonic("DAT")?.string_data()
    );

    Ok(())
}
