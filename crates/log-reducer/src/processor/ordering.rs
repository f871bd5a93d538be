use crate::ingestor::types::PingObservation;

/// Flags replies that arrived out of the order their requests were sent.
///
/// A ping is out of order when it is marked lost, or when some later ping's
/// reply was received strictly before its own. This models a FIFO channel:
/// replies must come back in request order, and a reply that never comes
/// back at all broke the order by definition.
///
/// Implemented as a reverse scan carrying the suffix minimum of the receive
/// timestamps, the O(n) equivalent of the pairwise "any later ping finishes
/// earlier" check. Lost pings contribute no receive timestamp, so they do
/// not update the minimum.
pub fn flag_out_of_order(observations: &[PingObservation]) -> Vec<bool> {
    let mut flags = vec![false; observations.len()];
    let mut lowest_receive_ns = u64::MAX;

    for (i, observation) in observations.iter().enumerate().rev() {
        match observation.reply {
            None => flags[i] = true,
            Some(reply) => {
                if reply.receive_reply_ns > lowest_receive_ns {
                    flags[i] = true;
                }
                lowest_receive_ns = lowest_receive_ns.min(reply.receive_reply_ns);
            }
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestor::types::PingReply;

    fn arrived(ping_no: u64, send_request_ns: u64, receive_reply_ns: u64) -> PingObservation {
        PingObservation {
            ping_no,
            send_request_ns,
            reply: Some(PingReply {
                reply_ns: receive_reply_ns.saturating_sub(1),
                receive_reply_ns,
                latency_to_there_ns: 1,
                latency_from_there_ns: 1,
                rtt_ns: 2,
            }),
        }
    }

    fn lost(ping_no: u64, send_request_ns: u64) -> PingObservation {
        PingObservation {
            ping_no,
            send_request_ns,
            reply: None,
        }
    }

    #[test]
    fn later_earlier_reply_flags_all_predecessors_it_overtook() {
        let observations = [
            arrived(0, 0, 100),
            arrived(1, 10, 90),
            arrived(2, 20, 110),
            arrived(3, 30, 80),
        ];
        assert_eq!(
            flag_out_of_order(&observations),
            vec![true, true, true, false]
        );
    }

    #[test]
    fn in_order_replies_are_unflagged() {
        let observations = [arrived(0, 0, 50), arrived(1, 10, 60), arrived(2, 20, 70)];
        assert_eq!(flag_out_of_order(&observations), vec![false, false, false]);
    }

    #[test]
    fn lost_ping_is_always_flagged() {
        let observations = [arrived(0, 0, 50), lost(1, 10), arrived(2, 20, 70)];
        assert_eq!(flag_out_of_order(&observations), vec![false, true, false]);
    }

    #[test]
    fn lost_ping_does_not_shadow_the_suffix_minimum() {
        // The lost ping at index 1 must not reset the minimum: index 0 is
        // still overtaken by index 2's earlier reply.
        let observations = [arrived(0, 0, 100), lost(1, 10), arrived(2, 20, 90)];
        assert_eq!(flag_out_of_order(&observations), vec![true, true, false]);
    }

    #[test]
    fn equal_receive_timestamps_are_not_out_of_order() {
        let observations = [arrived(0, 0, 50), arrived(1, 10, 50)];
        assert_eq!(flag_out_of_order(&observations), vec![false, false]);
    }

    #[test]
    fn empty_input_yields_no_flags() {
        assert!(flag_out_of_order(&[]).is_empty());
    }
}
