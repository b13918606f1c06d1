// Entry point for the ledger CLI. Each command opens what it needs (chain,
// wallet file) from the environment-driven Config and exits non-zero on error.
use clap::Parser;
use data_encoding::HEXLOWER;
use log::{error, LevelFilter};
use pow_ledger::core::monetary::conversions::format_units;
use pow_ledger::{
    convert_address, hash_pub_key, Block, Blockchain, BlockchainError, Command, Config,
    MiningCancel, Opt, ProofOfWork, Result, Transaction, UTXOSet, Wallets,
};
use std::process;
use uuid::Uuid;

fn main() {
    // Info by default, RUST_LOG still wins
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = Config::from_env().and_then(|config| run_command(opt.command, &config)) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Createblockchain { address } => {
            Blockchain::create_blockchain(&address, config)?;
            println!("Done!");
        }
        Command::Createwallet => {
            let mut wallets = Wallets::load(config.get_wallet_file())?;
            let address = wallets.create_wallet()?;
            println!("Your new address: {address}")
        }
        Command::GetBalance { address } => {
            let utxo_set = UTXOSet::new(Blockchain::open_blockchain(config)?);
            let balance = utxo_set.get_balance(&address)?;
            println!("Balance of {address}: {}", format_units(balance));
        }
        Command::ListAddresses => {
            let wallets = Wallets::load(config.get_wallet_file())?;
            for address in wallets.get_addresses() {
                println!("{address}")
            }
        }
        Command::Send {
            from,
            to,
            amount,
            miner,
        } => {
            let wallets = Wallets::load(config.get_wallet_file())?;
            let blockchain = Blockchain::open_blockchain(config)?;
            let utxo_set = UTXOSet::new(blockchain.clone());

            let transaction =
                Transaction::new_utxo_transaction(&from, &to, amount, &wallets, &utxo_set)?;
            // Refuse before mining, so a rejected transfer never pays the miner
            blockchain.check_transaction(&transaction)?;
            // A fresh uuid keeps two rewards to the same miner from sharing an id
            let coinbase_tx = Transaction::new_coinbase_tx(&miner, &Uuid::new_v4().to_string())?;

            let block = blockchain
                .add_block_with_cancel(&[coinbase_tx, transaction], &MiningCancel::new())?;
            if block.get_transactions().len() < 2 {
                return Err(BlockchainError::Transaction(format!(
                    "Transaction was rejected, but block {} paying the miner was still mined",
                    HEXLOWER.encode(block.get_hash())
                )));
            }
            println!("Success!")
        }
        Command::Printchain => {
            let blockchain = Blockchain::open_blockchain(config)?;
            for block in blockchain.iterator() {
                print_block(&block);
            }
            println!("Chain valid: {}", blockchain.validate_chain());
        }
        Command::ListTransactions => {
            let blockchain = Blockchain::open_blockchain(config)?;
            for block in blockchain.iterator() {
                for tx in block.get_transactions() {
                    print!("{tx}");
                }
            }
        }
        Command::Clear => {
            Blockchain::open_blockchain(config)?.clear()?;
            println!("Done!");
        }
    }
    Ok(())
}

fn print_block(block: &Block) {
    println!(
        "Pre block hash: {}",
        HEXLOWER.encode(block.get_pre_block_hash())
    );
    println!("Cur block hash: {}", HEXLOWER.encode(block.get_hash()));
    println!("Cur block Timestamp: {}", block.get_timestamp());
    println!(
        "Difficulty: {} Nonce: {}",
        block.get_difficulty(),
        block.get_nonce()
    );
    println!("PoW: {}", ProofOfWork::validate(block));

    for tx in block.get_transactions() {
        println!("- Transaction txid_hex: {}", HEXLOWER.encode(tx.get_id()));

        if !tx.is_coinbase() {
            for input in tx.get_vin() {
                let address = convert_address(&hash_pub_key(input.get_pub_key()));
                println!(
                    "-- Input txid = {}, vout = {}, from = {}",
                    HEXLOWER.encode(input.get_txid()),
                    input.get_vout(),
                    address,
                )
            }
        }
        for output in tx.get_vout() {
            let address = convert_address(output.get_pub_key_hash());
            println!(
                "-- Output value = {}, to = {}",
                format_units(output.get_value()),
                address,
            )
        }
    }
    println!()
}
