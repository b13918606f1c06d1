use crate::core::monetary::conversions::parse_coins;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pow-ledger", about = "A single-node proof-of-work ledger")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    #[command(name = "createblockchain", about = "Create a new blockchain")]
    Createblockchain {
        #[arg(help = "The address to send genesis block reward to")]
        address: String,
    },
    #[command(name = "createwallet", about = "Create a new wallet")]
    Createwallet,
    #[command(
        name = "getbalance",
        about = "Get the wallet balance of the target address"
    )]
    GetBalance {
        #[arg(help = "The wallet address")]
        address: String,
    },
    #[command(name = "listaddresses", about = "Print local wallet addresses")]
    ListAddresses,
    #[command(
        name = "send",
        about = "Send coins and mine them into a block right away"
    )]
    Send {
        #[arg(help = "Source wallet address")]
        from: String,
        #[arg(help = "Destination wallet address")]
        to: String,
        #[arg(help = "Amount to send in coins, up to 8 decimals", value_parser = parse_amount)]
        amount: u64,
        #[arg(help = "Address that receives the block reward")]
        miner: String,
    },
    #[command(name = "printchain", about = "Print all blocks in the blockchain")]
    Printchain,
    #[command(
        name = "listtransactions",
        about = "Print every transaction, newest first"
    )]
    ListTransactions,
    #[command(name = "clear", about = "Delete all chain data")]
    Clear,
}

/// Coins as typed by the user, converted to base units
fn parse_amount(text: &str) -> Result<u64, String> {
    parse_coins(text).map_err(|e| e.to_string())
}
