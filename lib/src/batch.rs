// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Batch signing
//!
//! Messages claim contiguous sequence numbers starting from the wallet's
//! current seqno and are signed strictly in order. Failed messages are
//! retried in place against a shared attempt budget, a user rejection
//! aborts the whole batch.

use log::{debug, info, warn};

use ledger_ton_core::{
    normalize_payload, payload::decode_cell, BatchProgress, BatchState, DerivationPath, Failure,
    SendMode, SigningRequest,
};

use crate::{
    config::TransferConfig,
    session::DeviceSession,
    transfer::{SignedTransfer, TransferParams, TransferRequest},
    Error,
};

/// Build the signing request for a batch message
pub fn prepare_message(
    config: &TransferConfig,
    r: &TransferRequest,
    seqno: u32,
    timeout: u32,
) -> Result<SigningRequest, Error> {
    let n = normalize_payload(r.payload.as_ref(), &r.to_address, config.default_bounce)?;
    let state_init = decode_cell(r.state_init.as_deref())?;

    let req = SigningRequest::new(
        &r.to_address,
        r.amount.clone(),
        n,
        SendMode::default(),
        seqno,
        timeout,
    )?;

    Ok(req.with_state_init(state_init))
}

/// Sign a batch of messages starting at `seqno`
///
/// Every message is validated before the device is used, so an unsupported
/// payload fails the batch without signing anything. A result shorter than
/// `requests` means the attempt budget was spent or the device could not be
/// reconnected, and must be treated as a failure by the caller.
pub async fn sign_batch(
    session: &DeviceSession,
    config: &TransferConfig,
    path: &DerivationPath,
    from_address: &str,
    requests: &[TransferRequest],
    seqno: u32,
) -> Result<Vec<SignedTransfer>, Error> {
    let timeout = config.expiration_time();

    let prepared = requests
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let n = u32::try_from(i)
                .ok()
                .and_then(|i| seqno.checked_add(i))
                .ok_or(Error::SeqnoOverflow {
                    start: seqno,
                    count: requests.len(),
                })?;
            prepare_message(config, r, n, timeout)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut progress = BatchProgress::new(prepared.len(), config.batch_attempts);
    let mut signed = Vec::with_capacity(prepared.len());

    while let Some(index) = progress.current() {
        let req = &prepared[index];
        let msg = &requests[index];

        match session.sign(path, req).await {
            Ok(cell) => {
                debug!("Signed message {} (seqno: {})", index, req.seqno);

                signed.push(SignedTransfer {
                    base64: cell.to_base64(),
                    seqno: req.seqno,
                    params: TransferParams {
                        amount: msg.amount.clone(),
                        from_address: from_address.to_string(),
                        to_address: msg.to_address.clone(),
                        comment: msg
                            .payload
                            .as_ref()
                            .and_then(|p| p.comment())
                            .map(str::to_string),
                        fee: None,
                        token: None,
                    },
                });

                progress.record_success();
            }
            Err(Error::UserRejected) => {
                progress.record_failure(Failure::Rejected);
                info!("Batch rejected at message {} (seqno: {})", index, req.seqno);
                return Err(Error::UserRejected);
            }
            Err(Error::NotConnected) => {
                warn!(
                    "Device disconnected at message {} (seqno: {}), signed {} of {}",
                    index,
                    req.seqno,
                    signed.len(),
                    requests.len()
                );
                return Ok(signed);
            }
            Err(e) => {
                let s = progress.record_failure(Failure::Transient);
                warn!("Signing message {} (seqno: {}) failed: {} ({})", index, req.seqno, e, s);

                // Transport loss drops the session, reconnect before retrying in place
                let lost = matches!(&e, Error::Device(d) if d.is_transport());
                if lost && !progress.is_finished() {
                    if let Err(e) = session.connect().await {
                        warn!("Reconnect failed after message {}: {}", index, e);
                        return Ok(signed);
                    }
                }
            }
        }
    }

    if progress.state() == BatchState::Exhausted {
        warn!(
            "Attempt budget exhausted, signed {} of {} messages",
            signed.len(),
            requests.len()
        );
    }

    Ok(signed)
}
