use alloy::primitives::Bytes;

use crate::data::labels::EntityLabeler;
use crate::data::types::{Category, EntityLabel, Transaction};

/// `transfer(address,uint256)`
pub const ERC20_TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// `transferFrom(address,address,uint256)`
pub const ERC721_TRANSFER_FROM_SELECTOR: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];

/// Extract the 4-byte method selector from transaction input data.
pub fn extract_selector(input: &Bytes) -> Option<[u8; 4]> {
    if input.len() < 4 {
        return None;
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&input[..4]);
    Some(selector)
}

/// Heuristic category from the call data and recipient, checked in order:
/// empty input, ERC-20 selector, ERC-721 selector, missing recipient.
pub fn classify(tx: &Transaction) -> Category {
    if tx.input.is_empty() {
        return Category::Transfer;
    }
    match extract_selector(&tx.input) {
        Some(ERC20_TRANSFER_SELECTOR) => Category::Erc20Transfer,
        Some(ERC721_TRANSFER_FROM_SELECTOR) => Category::Erc721Transfer,
        _ if tx.to.is_none() => Category::ContractCreation,
        _ => Category::ContractInteraction,
    }
}

/// Attach the category and, when the labeler knows either party, an entity
/// label. The sender's label takes precedence over the recipient's.
pub async fn annotate(tx: Transaction, labeler: &dyn EntityLabeler) -> Transaction {
    let category = classify(&tx);

    let mut label = None;
    if let Some(from) = tx.from {
        label = labeler.label_for(from).await.map(EntityLabel::Source);
    }
    if label.is_none() {
        if let Some(to) = tx.to {
            label = labeler.label_for(to).await.map(EntityLabel::Dest);
        }
    }

    tx.with_classification(category, label)
}
