//! 报文提取状态机
//!
//! 每次调用在当前累积缓冲上尝试提取一条完整报文，返回
//! （可能的消息，已消耗字节数），调用方据此收缩缓冲。函数本身
//! 无状态，缓冲由成帧阶段独占持有。
//!
//! 报文格式：3 字节报文头 + 载荷。首字节最高位标记报文起始，
//! 三个字节都只有低 7 位携带数据；掩码后的 b1、b2 按大端拼成
//! 14 位的报文总长（含报文头）。

use tracing::trace;

use crate::constants::*;
use crate::message::BoardMessage;

/// 尝试从缓冲中提取一条报文
///
/// 返回值第二项是本次消耗的字节数：
/// - 缓冲不足 3 字节或不足一条完整报文时消耗 0，等待更多字节；
/// - 报文头起始位校验失败时恰好消耗 1 字节，逐字节重新同步；
/// - 保活报文消耗 3 字节且不产出消息；
/// - 完整报文消耗其全长并产出消息。
pub fn extract_message(bytes: &[u8]) -> (Option<BoardMessage>, usize) {
    // 合法报文至少 3 字节，不足时什么都不做
    if bytes.len() < HEADER_LEN {
        return (None, 0);
    }

    // 起始位校验。首字节没有置位说明报文头已损坏（或从流中间
    // 开始读），丢弃一个字节后等下一轮重试，以期重新对齐。
    // 这里必须是按位与，写成按位或的话条件恒真，重同步分支
    // 永远走不到。
    if bytes[0] & MESSAGE_BIT == 0 {
        trace!(byte = format_args!("{:02x}", bytes[0]), "丢弃失步字节");
        return (None, 1);
    }

    // 低 7 位才是数据
    let code = bytes[0] & MESSAGE_MASK;
    let message_len =
        ((bytes[1] & MESSAGE_MASK) as usize) << 7 | (bytes[2] & MESSAGE_MASK) as usize;
    // 两个长度字节各掩成 7 位，拼出的长度不可能越过 14 位上限
    debug_assert!(message_len <= MAX_MESSAGE_LEN);

    // 报文未到齐，报文头留在缓冲里等后续字节
    if bytes.len() < message_len {
        return (None, 0);
    }

    // 保活报文只有报文头，整条去掉即可
    if code == MSG_NONE {
        return (None, HEADER_LEN);
    }

    // 长度字段比报文头还短只能是损坏的报文头，同样逐字节重同步
    if message_len < HEADER_LEN {
        trace!(message_len, "报文长度字段非法，丢弃失步字节");
        return (None, 1);
    }

    let payload = &bytes[HEADER_LEN..message_len];
    let message = match code {
        MSG_BOARD_DUMP if payload.len() == BOARD_DUMP_PAYLOAD_LEN => {
            BoardMessage::board_dump(payload)
        }
        MSG_FIELD_UPDATE if payload.len() == FIELD_UPDATE_PAYLOAD_LEN => {
            BoardMessage::field_update(payload)
        }
        // 未实现的类型，以及载荷长度不符的已知类型
        other => BoardMessage::Unhandled { code: other },
    };

    (Some(message), message_len)
}
