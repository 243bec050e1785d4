//! Prompt text shared by all backend variants

use super::{AxisAttributes, RatingScale};

pub fn slang_prompt(word: &str) -> String {
  format!(
    "Here is a word: \"{word}\". Decide whether it is internet slang.\n\
     Respond only with a JSON object of the form {{\"is_internet_slang\": true|false}}."
  )
}

/// Axis-generation prompt; slang words are read in their internet-culture sense
pub fn axes_prompt(word: &str, is_slang: bool) -> String {
  let slang_context = if is_slang {
    "The given word must be taken in the context of internet slang.\n"
  } else {
    ""
  };

  format!(
    "Define 4 words to represent the word \"{word}\" on a cartesian compass, where each word \
     lies on an axis depending on its meaning.\n\
     {slang_context}\
     The chosen words must be something you can describe a person against.\n\
     Be as creative as possible and use meme culture and internet slang to define the words.\n\
     Also define the meaning of the x and y axis. The x and y axis must capture different \
     aspects of the given word.\n\
     positive_x and negative_x must be opposites, and the same for positive_y and negative_y.\n\
     Respond only with a JSON object with the string fields \"x_meaning\", \"positive_x\", \
     \"negative_x\", \"y_meaning\", \"positive_y\" and \"negative_y\"."
  )
}

pub fn rating_prompt(
  chunk: &str,
  word: &str,
  attributes: &AxisAttributes,
  scale: RatingScale,
) -> String {
  format!(
    "You are placing the author of some posts on a \"{word}\" compass.\n\
     The x axis measures {x_aspect}: {max} means fully \"{x_positive}\", {min} means fully \
     \"{x_negative}\".\n\
     The y axis measures {y_aspect}: {max} means fully \"{y_positive}\", {min} means fully \
     \"{y_negative}\".\n\
     Use 0 on an axis when the posts say nothing about it.\n\n\
     Posts:\n{chunk}\n\n\
     Respond only with a JSON object {{\"x\": <integer>, \"y\": <integer>}} with both values \
     between {min} and {max}.",
    x_aspect = attributes.x_aspect,
    x_positive = attributes.x_positive,
    x_negative = attributes.x_negative,
    y_aspect = attributes.y_aspect,
    y_positive = attributes.y_positive,
    y_negative = attributes.y_negative,
    min = scale.min,
    max = scale.max,
  )
}

pub fn definition_prompt(word: &str) -> String {
  format!("Define the word \"{word}\" in the context of a person, possibly in terms of internet slang.")
}

/// Plain-text context for a word given the poles of both axes
pub fn context_prompt(word: &str, attributes: &AxisAttributes) -> String {
  format!(
    "Provide very short context for the word \"{word}\". Different aspects of the word lie on \
     a cartesian compass, where \"{}\" and \"{}\" are on the x axis and \"{}\" and \"{}\" \
     are on the y axis.",
    attributes.x_positive, attributes.x_negative, attributes.y_positive, attributes.y_negative
  )
}
