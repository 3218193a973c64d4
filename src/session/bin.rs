use super::{commit_over, receive_over};
use crate::channel_utils::tcp_channel::{connect, listen, TIMEOUT};
use crate::cli_utils::{
    create_channels, create_vole_sr, Args, Role, VoleReceiverUnion, VoleSenderUnion,
};
use crate::ring::GrElement;
use anyhow::{bail, Context, Result};
use itertools::Itertools;
use log::info;
use rand::Rng;
use scuttlebutt::{AbstractChannel, AesRng};

fn random_values(rng: &mut AesRng, m: usize) -> Vec<GrElement> {
    (0..m).map(|_| rng.gen::<GrElement>()).collect_vec()
}

fn sender_protocol<C: AbstractChannel>(
    channel: &mut C,
    vole: VoleSenderUnion,
    x: &[GrElement],
    open: bool,
) -> Result<()> {
    let mut rng = AesRng::new();

    let commitment =
        commit_over(channel, vole, x, &mut rng).with_context(|| "Failed to commit.")?;

    println!("sender committed to {} elements.", commitment.len());

    if open {
        commitment
            .send_opening(channel)
            .with_context(|| "Failed to send the opening.")?;

        println!("sender opened.");
    }

    Ok(())
}

fn receiver_protocol<C: AbstractChannel>(
    channel: &mut C,
    vole: VoleReceiverUnion,
    m: usize,
    open: bool,
) -> Result<Option<Vec<GrElement>>> {
    let mut rng = AesRng::new();

    let commitment =
        receive_over(channel, vole, m, &mut rng).with_context(|| "Failed to receive.")?;

    println!("receiver holds a commitment to {} elements.", commitment.len());

    if !open {
        return Ok(None);
    }

    let values = commitment
        .receive_opening(channel)
        .with_context(|| "Failed to verify the opening.")?;

    println!("receiver accepted the opening.");

    Ok(Some(values))
}

fn print_values(label: &str, values: &[GrElement]) {
    for (i, v) in values.iter().enumerate() {
        println!("{}[{}] = {:?}", label, i, v);
    }
}

/// Run the party selected by `args.role`.
pub fn run(args: Args) -> Result<()> {
    let Args {
        role,
        batch_size,
        level,
        addr,
        port,
        channel_type,
        vole_type,
        open,
        verbose,
    } = args;

    let (vole_s, vole_r) = create_vole_sr(vole_type, level);

    info!(
        "role = {}, m = {}, vole = {}, level = {}",
        role, batch_size, vole_type, level
    );

    match role {
        Role::Sender => {
            let mut rng = AesRng::new();
            let x = random_values(&mut rng, batch_size);

            if verbose {
                print_values("X", &x);
            }

            let mut channel = connect(addr.as_str(), TIMEOUT)
                .with_context(|| format!("Failed to connect to {}.", addr))?;

            sender_protocol(&mut channel, vole_s, &x, open)?;
        }
        Role::Receiver => {
            let mut channel =
                listen(port).with_context(|| format!("Failed to listen on {}.", port))?;

            let values = receiver_protocol(&mut channel, vole_r, batch_size, open)?;

            if let (true, Some(values)) = (verbose, values) {
                print_values("X", &values);
            }
        }
        Role::Local => {
            let (mut s_ch, mut r_ch) = create_channels(channel_type, port)
                .with_context(|| "Failed to create channels.")?;

            println!("channels prepared.");

            let mut rng = AesRng::new();
            let x = random_values(&mut rng, batch_size);
            let xs = x.clone();

            let handle =
                std::thread::spawn(move || sender_protocol(&mut s_ch, vole_s, &xs, open));

            let values = receiver_protocol(&mut r_ch, vole_r, batch_size, open)?;

            match handle.join() {
                Ok(res) => res?,
                Err(_) => bail!("sender thread panicked @{}:{}", file!(), line!()),
            }

            if let Some(values) = values {
                if values != x {
                    bail!("opened values differ from the committed ones @{}:{}", file!(), line!());
                }
                if verbose {
                    print_values("X", &values);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_utils::{ChannelType, VoleType};
    use crate::vole::SecurityLevel;

    fn local_args(channel_type: ChannelType, vole_type: VoleType, open: bool) -> Args {
        Args {
            role: Role::Local,
            batch_size: 3,
            level: SecurityLevel::SemiHonest,
            addr: "127.0.0.1:10120".to_owned(),
            port: 10120,
            channel_type,
            vole_type,
            open,
            verbose: false,
        }
    }

    #[test]
    fn test_local_dummy() {
        run(local_args(ChannelType::CrossBeam, VoleType::Dummy, true)).unwrap();
        run(local_args(ChannelType::Unix, VoleType::Dummy, false)).unwrap();
    }

    #[test]
    fn test_local_ot_tcp() {
        run(local_args(ChannelType::Tcp, VoleType::Ot, true)).unwrap();
    }
}
