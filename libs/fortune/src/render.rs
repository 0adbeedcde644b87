use crate::fortune::FortuneResult;
use crate::message::OutboundMessage;

/// Image shown above the fortune when none is configured.
pub const DEFAULT_IMAGE_URL: &str = "https://i.imgur.com/u5n4AAu.png";

/// Text body of a fortune message.
pub fn render_fortune_text(fortune: &FortuneResult) -> String {
    format!(
        "🔮 今日の運勢 🔮\n\n\
         {date}\n\n\
         【総合運】{score}点\n\
         {level}\n\n\
         【今日のアドバイス】\n\
         {advice}\n\n\
         【ラッキーカラー】\n\
         {color}\n\n\
         【ラッキーアイテム】\n\
         {item}\n\n\
         良い一日を〜!✨",
        date = fortune.date.japanese(),
        score = fortune.score,
        level = fortune.level.label(),
        advice = fortune.advice,
        color = fortune.lucky_color,
        item = fortune.lucky_item,
    )
}

/// The image followed by the rendered text, in delivery order.
pub fn fortune_messages(fortune: &FortuneResult, image_url: &str) -> Vec<OutboundMessage> {
    vec![
        OutboundMessage::image(image_url),
        OutboundMessage::text(render_fortune_text(fortune)),
    ]
}
